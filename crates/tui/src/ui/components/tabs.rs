use engine::Screen;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::theme::Theme;

/// Dashboard and Reports are the two destinations; the form screens show
/// as a third, transient tab.
pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: Screen, theme: &Theme) {
    let mut tabs = vec![Screen::Dashboard, Screen::Reports];
    if matches!(active, Screen::Add | Screen::Edit) {
        tabs.push(active);
    }

    let mut spans = vec![Span::raw(" ")];
    for (i, screen) in tabs.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.border)));
        }

        let style = if screen == active {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.text_muted)
        };
        spans.push(Span::styled(screen.label(), style));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
