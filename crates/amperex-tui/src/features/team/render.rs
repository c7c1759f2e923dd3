use amperex_types::User;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn render_team(frame: &mut Frame, user: Option<&User>, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Team",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    if let Some(user) = user {
        lines.push(Line::from(vec![
            Span::raw(user.display_name().to_string()),
            Span::styled(
                format!("  <{}>", user.display_email()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        if let Some(role) = &user.role {
            lines.push(Line::from(Span::styled(
                format!("role: {role}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Team management is not available from the console.",
        Style::default().fg(Color::DarkGray),
    )));

    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}
