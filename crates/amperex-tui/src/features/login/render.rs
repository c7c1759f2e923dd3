//! Login page view.

use amperex_core::auth::reset::OTP_LENGTH;
use amperex_core::login_flow::LoginPage;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use super::state::{Field, LoginState};
use crate::render::{centered_rect, spinner};

const CARD_WIDTH: u16 = 60;
const CARD_HEIGHT: u16 = 18;
const LABEL_WIDTH: usize = 10;

/// Renders the login card centered in `area`.
pub fn render_login(frame: &mut Frame, login: &LoginState, spinner_frame: usize, area: Rect) {
    let card = centered_rect(area, CARD_WIDTH, CARD_HEIGHT);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" AmpereX ");
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let field_width = (inner.width as usize).saturating_sub(LABEL_WIDTH + 4);
    let flow = &login.flow;

    let mut lines = vec![
        Line::from(Span::styled(
            flow.title(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            flow.description(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];

    match flow.page() {
        LoginPage::Login => {
            lines.push(input_line(
                "Username",
                &login.username,
                login.focus == Field::Username,
                field_width,
            ));
            lines.push(input_line(
                "Password",
                &"*".repeat(login.password.chars().count()),
                login.focus == Field::Password,
                field_width,
            ));
        }
        LoginPage::ForgotPassword => {
            lines.push(input_line("Email", &login.email, true, field_width));
        }
        LoginPage::OtpVerification => {
            lines.push(Line::from(vec![
                Span::styled("Sent to ", Style::default().fg(Color::DarkGray)),
                Span::raw(flow.reset_email().to_string()),
            ]));
            lines.push(otp_line(flow.otp()));
        }
    }

    lines.push(Line::default());
    lines.push(submit_line(
        flow.submit_label(),
        flow.can_submit(),
        flow.is_loading(),
        spinner_frame,
    ));
    lines.push(Line::default());

    if let Some(error) = flow.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(notice) = flow.notice() {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Green),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        help_text(flow.page()),
        Style::default().fg(Color::DarkGray),
    )));

    let para = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

fn help_text(page: LoginPage) -> &'static str {
    match page {
        LoginPage::Login => "Tab switch field · Enter sign in · Ctrl-F forgot password · Ctrl-C quit",
        LoginPage::ForgotPassword => "Enter send code · Esc back to login · Ctrl-C quit",
        LoginPage::OtpVerification => "Enter verify · Ctrl-R resend · Esc back · Ctrl-C quit",
    }
}

fn input_line(label: &str, value: &str, focused: bool, width: usize) -> Line<'static> {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let cursor = if focused { "█" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
        Span::raw("["),
        Span::raw(tail_fit(value, width.saturating_sub(1))),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::raw("]"),
    ])
}

fn otp_line(otp: &str) -> Line<'static> {
    let mut spans = vec![Span::raw(format!("{:<LABEL_WIDTH$}", "Code"))];
    let digits: Vec<char> = otp.chars().collect();
    for i in 0..OTP_LENGTH {
        let slot = digits.get(i).map_or_else(|| " ".to_string(), char::to_string);
        let style = if i == digits.len() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("[{slot}]"), style));
    }
    Line::from(spans)
}

fn submit_line(label: &str, enabled: bool, loading: bool, spinner_frame: usize) -> Line<'static> {
    let style = if enabled {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![Span::styled(format!("  {label}  "), style)];
    if loading {
        spans.push(Span::raw(format!(" {}", spinner(spinner_frame))));
    }
    Line::from(spans)
}

/// Keeps the end of `value` visible when it is wider than `width` columns.
fn tail_fit(value: &str, width: usize) -> String {
    if value.width() <= width {
        return value.to_string();
    }
    let mut kept = String::new();
    let mut used = 0;
    for c in value.chars().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        used += w;
        kept.insert(0, c);
    }
    format!("…{kept}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_fit() {
        assert_eq!(tail_fit("admin", 10), "admin");
        assert_eq!(tail_fit("averylongusername", 6), "…rname");
    }
}
