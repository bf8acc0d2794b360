use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: String,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

/// Converts a list of key hints into styled spans for rendering.
pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(hints.len() * 3);

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(
            hint.key.clone(),
            Style::default().fg(theme.accent),
        ));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(theme.text_muted),
        ));
    }

    spans
}

/// One-line hint bar at the bottom of the screen.
pub fn render_bar(frame: &mut Frame<'_>, area: Rect, hints: &[KeyHint], theme: &Theme) {
    let mut spans = vec![Span::raw(" ")];
    spans.extend(hints_to_spans(hints, theme));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.surface)),
        area,
    );
}

/// Hint groups shared between screens.
pub mod common {
    use super::KeyHint;

    pub fn form_editing() -> Vec<KeyHint> {
        vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("→", "accept suggestion"),
            KeyHint::new("Enter", "save"),
            KeyHint::new("Esc", "cancel"),
        ]
    }

    /// Hints while a single-line input has focus.
    pub fn text_entry(confirm: &str) -> Vec<KeyHint> {
        vec![
            KeyHint::new("Enter", confirm),
            KeyHint::new("Esc", "cancel"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_are_separated() {
        let theme = Theme::default();
        let spans = hints_to_spans(
            &[KeyHint::new("a", "add"), KeyHint::new("q", "quit")],
            &theme,
        );
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "a add · q quit");
    }
}
