use engine::{Tracker, views};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::AppState,
    ui::{
        components::{
            card::{Card, StatCard},
            money::{long_date, styled_amount, styled_total},
        },
        theme::{Theme, category_color},
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, tracker: &Tracker, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Summary
            Constraint::Length(3), // Search
            Constraint::Min(3),    // Entries
        ])
        .split(area);

    render_summary(frame, layout[0], tracker, state, &theme);
    render_search(frame, layout[1], state, &theme);
    render_entries(frame, layout[2], tracker, state, &theme);
}

fn render_summary(
    frame: &mut Frame<'_>,
    area: Rect,
    tracker: &Tracker,
    state: &AppState,
    theme: &Theme,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let records = tracker.dataset().records();
    let name_card = Card::new("Motorcycle", theme).focused(state.dashboard.renaming.is_some());
    let name = match &state.dashboard.renaming {
        Some(typed) => Span::styled(format!("{typed}│"), Style::default().fg(theme.accent)),
        None => Span::styled(
            tracker.dataset().display_name().to_string(),
            Style::default()
                .fg(theme.text)
                .add_modifier(Modifier::BOLD),
        ),
    };
    let caption = match records.first() {
        Some(latest) => format!("Last service {}", long_date(latest.date)),
        None => "No services yet".to_string(),
    };
    name_card.render_with(
        frame,
        columns[0],
        Paragraph::new(vec![
            Line::from(name),
            Line::from(Span::styled(caption, Style::default().fg(theme.dim))),
        ]),
    );

    let entries = match records.len() {
        1 => "1 entry".to_string(),
        n => format!("{n} entries"),
    };
    StatCard::new("Total spent", styled_total(views::total(records), theme), theme)
        .caption(entries)
        .render(frame, columns[1]);
}

fn render_search(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dashboard = &state.dashboard;
    let content = if dashboard.searching {
        Span::styled(
            format!("{}│", dashboard.search),
            Style::default().fg(theme.accent),
        )
    } else if dashboard.search.is_empty() {
        Span::styled("press / to search", Style::default().fg(theme.dim))
    } else {
        Span::styled(dashboard.search.clone(), Style::default().fg(theme.text))
    };

    Card::new("Search", theme)
        .focused(dashboard.searching)
        .render_with(frame, area, Paragraph::new(Line::from(content)));
}

fn render_entries(
    frame: &mut Frame<'_>,
    area: Rect,
    tracker: &Tracker,
    state: &AppState,
    theme: &Theme,
) {
    let visible = views::search(tracker.dataset().records(), &state.dashboard.search);
    let card = Card::new("Maintenance log", theme).focused(
        !state.dashboard.searching && state.dashboard.renaming.is_none(),
    );

    if visible.is_empty() {
        let message = if state.dashboard.search.is_empty() {
            "Nothing logged yet. Press a to add the first entry."
        } else {
            "No entries match the search."
        };
        card.render_with(
            frame,
            area,
            Paragraph::new(Span::styled(message, Style::default().fg(theme.dim))),
        );
        return;
    }

    let items: Vec<ListItem<'_>> = visible
        .iter()
        .map(|expense| {
            let mut spans = vec![
                Span::styled("● ", Style::default().fg(category_color(&expense.category))),
                Span::styled(
                    format!("{:<24}", expense.category),
                    Style::default().fg(theme.text),
                ),
                Span::styled(
                    format!("{:<20}", long_date(expense.date)),
                    Style::default().fg(theme.text_muted),
                ),
                styled_amount(expense.amount, theme),
            ];
            if !expense.note.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", expense.note),
                    Style::default().fg(theme.dim),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(theme.border)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected(Some(state.dashboard.selected));

    let inner = card.inner(area);
    frame.render_widget(card.block(), area);
    frame.render_stateful_widget(list, inner, &mut list_state);
}
