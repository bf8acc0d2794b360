use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::{centered_box, theme::Theme};

/// Shown until the identity provider has resolved the stored session.
pub fn render(frame: &mut Frame<'_>, area: Rect) {
    let theme = Theme::default();
    let lines = vec![
        Line::from(Span::styled(
            "motolog",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Checking session…",
            Style::default().fg(theme.text_muted),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered_box(30, 2, area),
    );
}
