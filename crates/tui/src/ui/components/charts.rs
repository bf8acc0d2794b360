use engine::{MoneyCents, Report, money::format_amount};
use ratatui::{
    Frame,
    layout::{Direction, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup},
};

use crate::ui::{
    components::card::Card,
    theme::{Theme, report_color},
};

/// Horizontal bars, one per category, largest first.
pub fn render_category_bars(frame: &mut Frame<'_>, area: Rect, report: &Report, theme: &Theme) {
    let bars: Vec<Bar<'_>> = report
        .by_category
        .iter()
        .enumerate()
        .map(|(rank, row)| {
            let color = report_color(rank);
            Bar::default()
                .value(u64::try_from(row.total.cents()).unwrap_or(0))
                .label(Line::from(row.category.clone()))
                .text_value(format_amount(row.total))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(theme.background)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .label_style(Style::default().fg(theme.text_muted))
        .data(BarGroup::default().bars(&bars));

    Card::new("By category", theme).render_with(frame, area, chart);
}

/// Text bar such as `██████░░░░` for `value / max`.
#[must_use]
pub fn ascii_bar(value: MoneyCents, max: MoneyCents, width: usize) -> String {
    if max.cents() <= 0 {
        return "░".repeat(width);
    }

    let ratio = (value.cents() as f64 / max.cents() as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Share of `part` in `whole`, as a whole percentage.
#[must_use]
pub fn share_percent(part: MoneyCents, whole: MoneyCents) -> u16 {
    if whole.cents() <= 0 {
        return 0;
    }
    ((part.cents() as f64 / whole.cents() as f64) * 100.0).round().clamp(0.0, 100.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_the_maximum() {
        let cents = MoneyCents::new;
        assert_eq!(ascii_bar(cents(50), cents(100), 10), "█████░░░░░");
        assert_eq!(ascii_bar(cents(300), cents(100), 4), "████");
        assert_eq!(ascii_bar(cents(1), MoneyCents::ZERO, 3), "░░░");
    }

    #[test]
    fn shares_round_to_whole_percent() {
        let cents = MoneyCents::new;
        assert_eq!(share_percent(cents(1), cents(3)), 33);
        assert_eq!(share_percent(cents(2), cents(3)), 67);
        assert_eq!(share_percent(cents(5), MoneyCents::ZERO), 0);
    }
}
