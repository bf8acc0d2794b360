use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{centered_box, theme::Theme};

/// Modal yes/no question. Key handling lives in the app; this only draws.
pub fn render(frame: &mut Frame<'_>, area: Rect, title: &str, question: &str, theme: &Theme) {
    let width = u16::try_from(question.chars().count() + 6)
        .unwrap_or(u16::MAX)
        .clamp(30, 60);
    let rect = centered_box(width, 6, area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.warning))
        .style(Style::default().bg(theme.surface));

    let lines = vec![
        Line::from(Span::styled(question, Style::default().fg(theme.text))),
        Line::default(),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.accent)),
            Span::styled(" confirm   ", Style::default().fg(theme.text_muted)),
            Span::styled("n", Style::default().fg(theme.accent)),
            Span::styled(" cancel", Style::default().fg(theme.text_muted)),
        ]),
    ];

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        rect,
    );
}
