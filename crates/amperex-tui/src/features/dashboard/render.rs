//! Dashboard view.

use amperex_core::dashboard::{FallbackReason, StatsSource};
use amperex_types::DashboardSummary;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::state::DashboardState;
use crate::render::spinner;

const CARD_HEIGHT: u16 = 5;

pub fn render_dashboard(
    frame: &mut Frame,
    dashboard: &DashboardState,
    spinner_frame: usize,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(CARD_HEIGHT),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                "Automated MCB Testing",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Test execution overview",
                Style::default().fg(Color::DarkGray),
            )),
        ]),
        chunks[0],
    );

    let Some(outcome) = &dashboard.stats else {
        frame.render_widget(
            Paragraph::new(format!("{} Loading statistics...", spinner(spinner_frame))),
            chunks[1],
        );
        return;
    };

    render_cards(frame, &outcome.summary, chunks[1]);

    let mut status = vec![source_span(&outcome.source)];
    if let Some(at) = dashboard.loaded_at {
        status.push(Span::styled(
            format!("  · updated {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if dashboard.loading {
        status.push(Span::raw(format!("  {}", spinner(spinner_frame))));
    }
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[2]);
}

fn render_cards(frame: &mut Frame, summary: &DashboardSummary, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let values = [
        ("Tests Executed", format_count(summary.tests_executed)),
        ("Active Sessions", summary.active_sessions.to_string()),
        ("System Uptime", format!("{:.1}%", summary.system_uptime)),
        ("Compliance Rate", format!("{:.1}%", summary.compliance_rate)),
    ];

    for ((title, value), card) in values.into_iter().zip(cards.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "));
        let para = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                value,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(para, *card);
    }
}

fn source_span(source: &StatsSource) -> Span<'static> {
    let color = match source {
        StatsSource::Live => Color::Green,
        StatsSource::Degraded { .. } | StatsSource::Fallback(FallbackReason::NotConfigured) => {
            Color::Yellow
        }
        StatsSource::Fallback(_) => Color::Red,
    };
    Span::styled(format!("● {source}"), Style::default().fg(color))
}

/// Groups thousands: `1234` → `1,234`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
