pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use chrono::NaiveDate;
use engine::{Screen, Tracker};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{AppState, Surface, surface_of};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, tracker: &Tracker, state: &AppState, today: NaiveDate) {
    let area = frame.area();
    let theme = Theme::default();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    match surface_of(tracker) {
        Surface::Loading => screens::loading::render(frame, area),
        Surface::Login => screens::login::render(frame, area, state),
        Surface::Signed(screen) => render_shell(frame, area, screen, tracker, state, today),
    }

    if state.confirm_logout {
        components::confirm::render(
            frame,
            area,
            "Sign out",
            "Sign out of this device?",
            &theme,
        );
    }
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_shell(
    frame: &mut Frame<'_>,
    area: Rect,
    screen: Screen,
    tracker: &Tracker,
    state: &AppState,
    today: NaiveDate,
) {
    let theme = Theme::default();
    let banner_height = u16::from(tracker.dataset().error().is_some());

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Info bar
            Constraint::Length(banner_height), // Subscription error
            Constraint::Length(2),             // Tabs
            Constraint::Min(0),                // Content
            Constraint::Length(1),             // Hints
        ])
        .split(area);

    render_info_bar(frame, layout[0], tracker, &theme);
    if let Some(err) = tracker.dataset().error() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" Live updates failed: {err}"),
                Style::default().fg(theme.background).bg(theme.error),
            )),
            layout[1],
        );
    }
    components::tabs::render_tabs(frame, layout[2], screen, &theme);

    let content = layout[3];
    match screen {
        Screen::Dashboard => screens::dashboard::render(frame, content, tracker, state),
        Screen::Add | Screen::Edit => screens::form::render(frame, content, tracker, state),
        Screen::Reports => screens::reports::render(frame, content, tracker, state, today),
    }

    components::hints::render_bar(frame, layout[4], &hints_for(screen, state), &theme);

    if let Some(id) = tracker.pending_delete() {
        let label = tracker
            .dataset()
            .get(id)
            .map(|expense| format!("Delete \"{}\"? This cannot be undone.", expense.category))
            .unwrap_or_else(|| "Delete this entry? This cannot be undone.".to_string());
        components::confirm::render(frame, area, "Delete entry", &label, &theme);
    }
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, tracker: &Tracker, theme: &Theme) {
    let email = tracker
        .session()
        .current_user()
        .map(|identity| identity.email.as_str())
        .unwrap_or("-");

    let line = Line::from(vec![
        Span::styled(
            tracker.dataset().display_name().to_string(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {email}")),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn hints_for(screen: Screen, state: &AppState) -> Vec<components::hints::KeyHint> {
    use components::hints::{KeyHint, common};

    match screen {
        Screen::Dashboard if state.dashboard.renaming.is_some() => common::text_entry("save"),
        Screen::Dashboard if state.dashboard.searching => common::text_entry("done"),
        Screen::Dashboard => vec![
            KeyHint::new("a", "add"),
            KeyHint::new("Enter", "edit"),
            KeyHint::new("d", "delete"),
            KeyHint::new("/", "search"),
            KeyHint::new("m", "rename"),
            KeyHint::new("r", "reports"),
            KeyHint::new("l", "logout"),
            KeyHint::new("q", "quit"),
        ],
        Screen::Add => common::form_editing(),
        Screen::Edit => {
            let mut hints = common::form_editing();
            hints.push(KeyHint::new("Ctrl+D", "delete"));
            hints
        }
        Screen::Reports => vec![
            KeyHint::new("←→", "period"),
            KeyHint::new("Tab", "range field"),
            KeyHint::new("b", "back"),
            KeyHint::new("q", "quit"),
        ],
    }
}

/// A `width` x `height` rect centered in `area`, clipped to it.
pub fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
