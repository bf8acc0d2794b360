use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::AppState,
    ui::{centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let login = &state.login;

    let card_area = centered_box(48, 7, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(Span::styled(
            " Sign in ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.surface));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Prompt
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // E-mail
        ])
        .margin(1)
        .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Track what your motorcycle costs you.",
            Style::default().fg(theme.text_muted),
        )),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("E-mail ", Style::default().fg(theme.dim)),
            Span::styled(
                format!("{}│", login.email),
                Style::default().fg(theme.accent),
            ),
        ])),
        rows[2],
    );

    // Failure text goes under the box.
    let mut lines = Vec::new();
    if let Some(message) = &login.message {
        lines.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(theme.error),
        )));
    }
    if let Some(hint) = &login.domain_hint {
        lines.push(Line::from(Span::styled(
            hint.as_str(),
            Style::default().fg(theme.warning),
        )));
    }
    if lines.is_empty() {
        return;
    }

    let below = Rect {
        x: card_area.x,
        y: (card_area.y + card_area.height + 1).min(area.bottom().saturating_sub(1)),
        width: card_area.width,
        height: 3.min(area.bottom().saturating_sub(card_area.bottom())),
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        below,
    );
}
