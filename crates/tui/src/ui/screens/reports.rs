use chrono::NaiveDate;
use engine::{Report, TimeWindow, Tracker, views};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

use crate::{
    app::{AppState, RangeField, ReportsState, WindowKind},
    ui::{
        components::{
            card::{Card, StatCard},
            charts::{ascii_bar, render_category_bars, share_percent},
            money::{styled_amount, styled_total},
        },
        theme::{Theme, report_color},
    },
};

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    tracker: &Tracker,
    state: &AppState,
    today: NaiveDate,
) {
    let theme = Theme::default();
    let reports = &state.reports;
    let window = reports.window();
    let report = views::report(tracker.dataset().records(), &window, today);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Period selector
            Constraint::Length(4), // Totals
            Constraint::Min(4),    // Breakdown
        ])
        .split(area);

    render_period(frame, layout[0], reports, &window, &theme);
    render_totals(frame, layout[1], &report, &theme);

    if report.count == 0 {
        Card::new("Breakdown", &theme).render_with(
            frame,
            layout[2],
            Paragraph::new(Span::styled(
                "No expenses in this period.",
                Style::default().fg(theme.dim),
            )),
        );
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[2]);
    render_table(frame, columns[0], &report, &theme);
    render_category_bars(frame, columns[1], &report, &theme);
}

fn render_period(
    frame: &mut Frame<'_>,
    area: Rect,
    reports: &ReportsState,
    window: &TimeWindow,
    theme: &Theme,
) {
    let mut spans = Vec::new();
    for (i, kind) in WindowKind::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let label = label_of(*kind);
        if *kind == reports.kind {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
        }
    }

    if reports.kind == WindowKind::Range {
        spans.push(Span::raw("    "));
        spans.extend(range_input(
            "From",
            &reports.from,
            reports.focus == Some(RangeField::From),
            theme,
        ));
        spans.push(Span::raw("  "));
        spans.extend(range_input(
            "To",
            &reports.to,
            reports.focus == Some(RangeField::To),
            theme,
        ));
        if matches!(
            window,
            TimeWindow::Range { from: None, .. } | TimeWindow::Range { to: None, .. }
        ) {
            spans.push(Span::styled(
                "  (showing everything until both dates are set)",
                Style::default().fg(theme.dim),
            ));
        }
    }

    Card::new("Period", theme).render_with(frame, area, Paragraph::new(Line::from(spans)));
}

fn label_of(kind: WindowKind) -> &'static str {
    match kind {
        WindowKind::AllTime => TimeWindow::AllTime.label(),
        WindowKind::CurrentMonth => TimeWindow::CurrentMonth.label(),
        WindowKind::CurrentYear => TimeWindow::CurrentYear.label(),
        WindowKind::Range => "Range",
    }
}

fn range_input(label: &str, value: &str, focused: bool, theme: &Theme) -> Vec<Span<'static>> {
    let shown = if value.is_empty() && !focused {
        "YYYY-MM-DD".to_string()
    } else if focused {
        format!("{value}│")
    } else {
        value.to_string()
    };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else if value.is_empty() {
        Style::default().fg(theme.dim)
    } else {
        Style::default().fg(theme.text)
    };

    vec![
        Span::styled(format!("{label} "), Style::default().fg(theme.text_muted)),
        Span::styled(shown, style),
    ]
}

fn render_totals(frame: &mut Frame<'_>, area: Rect, report: &Report, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    StatCard::new("Spent", styled_total(report.total, theme), theme).render(frame, columns[0]);
    StatCard::new(
        "Entries",
        Span::styled(report.count.to_string(), Style::default().fg(theme.text)),
        theme,
    )
    .caption(format!("{} categories", report.by_category.len()))
    .render(frame, columns[1]);
}

fn render_table(frame: &mut Frame<'_>, area: Rect, report: &Report, theme: &Theme) {
    let max = report
        .by_category
        .first()
        .map(|row| row.total)
        .unwrap_or_default();

    let rows: Vec<Row<'_>> = report
        .by_category
        .iter()
        .enumerate()
        .map(|(rank, row)| {
            let color = report_color(rank);
            Row::new(vec![
                Cell::from(Span::styled(row.category.clone(), Style::default().fg(color))),
                Cell::from(row.count.to_string()),
                Cell::from(styled_amount(row.total, theme)),
                Cell::from(format!("{:>3}%", share_percent(row.total, report.total))),
                Cell::from(Span::styled(
                    ascii_bar(row.total, max, 10),
                    Style::default().fg(color),
                )),
            ])
        })
        .collect();

    let header = Row::new(vec!["Category", "#", "Spent", "Share", ""])
        .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(4),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .column_spacing(1);

    Card::new("Categories", theme).render_with(frame, area, table);
}
