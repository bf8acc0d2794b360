use chrono::NaiveDate;
use engine::{MoneyCents, money::format_amount};
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Amount in the display currency format. Costs are never negative, so
/// there is no sign coloring.
#[must_use]
pub fn styled_amount(amount: MoneyCents, theme: &Theme) -> Span<'static> {
    Span::styled(format_amount(amount), Style::default().fg(theme.text))
}

/// Emphasized variant used for totals.
#[must_use]
pub fn styled_total(amount: MoneyCents, theme: &Theme) -> Span<'static> {
    Span::styled(
        format_amount(amount),
        Style::default()
            .fg(theme.positive)
            .add_modifier(Modifier::BOLD),
    )
}

/// "5 March 2024".
#[must_use]
pub fn long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_dates_spell_out_the_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(long_date(date), "5 March 2024");
    }
}
