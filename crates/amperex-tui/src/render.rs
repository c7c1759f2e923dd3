//! Pure view functions.
//!
//! Everything here takes `&AppState` and draws to a ratatui `Frame`; nothing
//! mutates state or returns effects.

use amperex_core::navigation::Route;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::state::AppState;
use crate::{dashboard, login, team};

const STATUS_HEIGHT: u16 = 1;
const MARGIN: u16 = 1;

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
const SPINNER_SPEED_DIVISOR: usize = 2;

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[(frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()]
}

/// Rect of at most `width` x `height`, centered in `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Renders the whole screen.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();

    if app.route == Route::Login {
        login::render_login(frame, &app.login, app.spinner_frame, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_nav(app, frame, chunks[0]);
    match app.route {
        Route::Dashboard => {
            dashboard::render_dashboard(frame, &app.dashboard, app.spinner_frame, chunks[1]);
        }
        Route::Team => team::render_team(frame, app.user.as_ref(), chunks[1]),
        Route::Login => {}
    }
    render_status_line(app, frame, chunks[2]);
}

fn render_nav(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        "AmpereX  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for route in Route::PAGES {
        let style = if route == app.route {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", route.title()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let (name, email) = app
        .user
        .as_ref()
        .map_or(("Guest User", "guest@example.com"), |u| {
            (u.display_name(), u.display_email())
        });

    let line = Line::from(vec![
        Span::raw(name.to_string()),
        Span::styled(format!(" <{email}>"), Style::default().fg(Color::DarkGray)),
        Span::styled(
            "   d dashboard · t team · r refresh · l logout · q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
