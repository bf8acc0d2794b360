use engine::{Tracker, views};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, FormField, FormState},
    ui::{
        components::card::Card,
        theme::{Theme, category_color},
    },
};

const FIELDS: [FormField; 4] = [
    FormField::Category,
    FormField::Date,
    FormField::Amount,
    FormField::Note,
];

pub fn render(frame: &mut Frame<'_>, area: Rect, tracker: &Tracker, state: &AppState) {
    let theme = Theme::default();
    let title = match tracker.editing() {
        Some(expense) => format!("Edit {}", expense.category),
        None => "New entry".to_string(),
    };
    let card = Card::new(&title, &theme).focused(true);

    let Some(form) = &state.form else {
        card.render_with(frame, area, Paragraph::new(""));
        return;
    };

    let inner = card.inner(area);
    frame.render_widget(card.block(), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELDS.len() as u16 * 2), // Inputs
            Constraint::Length(2),                       // Suggestions
            Constraint::Length(1),                       // Validation
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(FIELDS.map(|_| Constraint::Length(2)))
        .split(layout[0]);
    for (field, row) in FIELDS.iter().zip(rows.iter()) {
        render_field(frame, *row, form, *field, &theme);
    }

    let known = views::known_categories(tracker.dataset().records());
    render_suggestions(frame, layout[1], form, &known, &theme);

    if let Some(err) = tracker.form_error() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                err.to_string(),
                Style::default().fg(theme.error),
            )),
            layout[2],
        );
    }
}

fn render_field(
    frame: &mut Frame<'_>,
    area: Rect,
    form: &FormState,
    field: FormField,
    theme: &Theme,
) {
    let focused = form.focus == field;
    let value = form.field(field);

    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    };
    let mut spans = vec![Span::styled(format!("{:<20}", field.label()), label_style)];
    if field == FormField::Category && !value.is_empty() {
        spans.push(Span::styled("● ", Style::default().fg(category_color(value))));
    }
    spans.push(Span::styled(value.to_string(), Style::default().fg(theme.text)));
    if focused {
        spans.push(Span::styled("│", Style::default().fg(theme.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_suggestions(
    frame: &mut Frame<'_>,
    area: Rect,
    form: &FormState,
    known: &[String],
    theme: &Theme,
) {
    if form.focus != FormField::Category {
        return;
    }
    let suggestions = form.suggestions(known);
    if suggestions.is_empty() {
        return;
    }

    let mut spans = vec![Span::styled(
        format!("{:<20}", "Suggestions"),
        Style::default().fg(theme.dim),
    )];
    for (i, suggestion) in suggestions.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if i == 0 {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text_muted)
        };
        spans.push(Span::styled(*suggestion, style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
