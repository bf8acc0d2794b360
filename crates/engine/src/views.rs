//! Derived views over a dataset snapshot.
//!
//! Everything here is pure: callers pass the current records and get a fresh
//! result back, nothing is cached or updated incrementally.
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::{Expense, money::MoneyCents};

/// Sort newest first. The sort is stable, so records sharing a date keep the
/// order they arrived in.
pub fn sort_by_date_desc(records: &mut [Expense]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Records whose category or note contains `term`, ignoring case, newest
/// first. An empty term matches everything.
pub fn search<'a>(records: &'a [Expense], term: &str) -> Vec<&'a Expense> {
    let needle = term.to_lowercase();
    let mut matches: Vec<&Expense> = records
        .iter()
        .filter(|expense| {
            expense.category.to_lowercase().contains(&needle)
                || expense.note.to_lowercase().contains(&needle)
        })
        .collect();
    matches.sort_by(|a, b| b.date.cmp(&a.date));
    matches
}

pub fn total<'a>(records: impl IntoIterator<Item = &'a Expense>) -> MoneyCents {
    records.into_iter().map(|expense| expense.amount).sum()
}

/// Distinct categories used so far, alphabetically. Offered as suggestions
/// when typing a new entry.
pub fn known_categories(records: &[Expense]) -> Vec<String> {
    records
        .iter()
        .map(|expense| expense.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Reporting period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    AllTime,
    /// Calendar month containing "today".
    CurrentMonth,
    /// Calendar year containing "today".
    CurrentYear,
    /// Inclusive range. Until both bounds are known the range matches
    /// everything.
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl TimeWindow {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            Self::AllTime => true,
            Self::CurrentMonth => date.year() == today.year() && date.month() == today.month(),
            Self::CurrentYear => date.year() == today.year(),
            Self::Range {
                from: Some(from),
                to: Some(to),
            } => from <= date && date <= to,
            Self::Range { .. } => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AllTime => "All time",
            Self::CurrentMonth => "This month",
            Self::CurrentYear => "This year",
            Self::Range { .. } => "Range",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: MoneyCents,
    pub count: usize,
}

/// Spending summary for one [`TimeWindow`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Report {
    /// Largest total first; equal totals are ordered by category.
    pub by_category: Vec<CategoryTotal>,
    pub total: MoneyCents,
    pub count: usize,
}

pub fn report(records: &[Expense], window: &TimeWindow, today: NaiveDate) -> Report {
    let mut groups: BTreeMap<&str, (MoneyCents, usize)> = BTreeMap::new();
    let mut total = MoneyCents::ZERO;
    let mut count = 0;

    for expense in records
        .iter()
        .filter(|expense| window.contains(expense.date, today))
    {
        let entry = groups.entry(expense.category.as_str()).or_insert((MoneyCents::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
        total += expense.amount;
        count += 1;
    }

    let mut by_category: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();
    // BTreeMap already yields categories alphabetically; the stable sort
    // keeps that order among equal totals.
    by_category.sort_by(|a, b| b.total.cmp(&a.total));

    Report {
        by_category,
        total,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpenseId, UserId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: &str, category: &str, when: NaiveDate, amount: i64, note: &str) -> Expense {
        Expense {
            id: ExpenseId::new(id),
            owner: UserId::new("u1"),
            category: category.to_string(),
            date: when,
            amount: MoneyCents::new(amount),
            note: note.to_string(),
            created_at: 0,
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("a", "Oil change", date(2024, 1, 10), 50_000, "Motul"),
            expense("b", "Tires", date(2024, 3, 2), 320_000, "Michelin rear"),
            expense("c", "Chain kit", date(2023, 11, 20), 180_000, ""),
            expense("d", "oil filter", date(2024, 3, 2), 25_000, "with OIL change"),
            expense("e", "Tires", date(2024, 3, 15), 300_000, "front"),
        ]
    }

    fn ids(records: &[&Expense]) -> Vec<String> {
        records.iter().map(|e| e.id.to_string()).collect()
    }

    #[test]
    fn search_matches_category_or_note_case_insensitively() {
        let records = sample();
        let found = search(&records, "OIL");
        assert_eq!(ids(&found), vec!["d", "a"]);

        let found = search(&records, "michelin");
        assert_eq!(ids(&found), vec!["b"]);

        assert!(search(&records, "brake").is_empty());
    }

    #[test]
    fn search_inclusion_matches_the_substring_rule() {
        let records = sample();
        for term in ["", "o", "ti", "FRONT", "chain", "x"] {
            let found = search(&records, term);
            let needle = term.to_lowercase();
            for record in &records {
                let expected = record.category.to_lowercase().contains(&needle)
                    || record.note.to_lowercase().contains(&needle);
                let included = found.iter().any(|r| r.id == record.id);
                assert_eq!(expected, included, "term {term:?} record {}", record.id);
            }
        }
    }

    #[test]
    fn empty_search_returns_everything_newest_first() {
        let records = sample();
        let found = search(&records, "");
        assert_eq!(ids(&found), vec!["e", "b", "d", "a", "c"]);
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let mut records = sample();
        sort_by_date_desc(&mut records);
        let once: Vec<_> = records.iter().map(|e| e.id.clone()).collect();
        // "b" arrived before "d" and both are dated 2024-03-02.
        assert_eq!(
            once,
            ["e", "b", "d", "a", "c"].map(ExpenseId::new).to_vec()
        );

        sort_by_date_desc(&mut records);
        let twice: Vec<_> = records.iter().map(|e| e.id.clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn known_categories_are_unique_and_sorted() {
        let records = sample();
        assert_eq!(
            known_categories(&records),
            vec!["Chain kit", "Oil change", "Tires", "oil filter"]
        );
    }

    #[test]
    fn report_partitions_records_by_category() {
        let records = sample();
        let report = report(&records, &TimeWindow::AllTime, date(2024, 3, 20));

        assert_eq!(report.count, records.len());
        assert_eq!(report.total, total(&records));
        let summed: MoneyCents = report.by_category.iter().map(|c| c.total).sum();
        assert_eq!(summed, report.total);
        let counted: usize = report.by_category.iter().map(|c| c.count).sum();
        assert_eq!(counted, records.len());

        let names: Vec<_> = report
            .by_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["Tires", "Chain kit", "Oil change", "oil filter"]);
        assert_eq!(report.by_category[0].total, MoneyCents::new(620_000));
        assert_eq!(report.by_category[0].count, 2);
        assert!(
            report
                .by_category
                .windows(2)
                .all(|pair| pair[0].total >= pair[1].total)
        );
    }

    #[test]
    fn category_totals_with_cents_add_up_to_the_grand_total() {
        let records = vec![
            expense("a", "Air filter", date(2024, 1, 1), 76_09, ""),
            expense("b", "Brakes", date(2024, 1, 2), 92_65, ""),
            expense("c", "Brakes", date(2024, 1, 3), 83_76, ""),
        ];
        let report = report(&records, &TimeWindow::AllTime, date(2024, 1, 4));

        let summed: MoneyCents = report.by_category.iter().map(|c| c.total).sum();
        assert_eq!(summed, report.total);
        assert_eq!(report.total, MoneyCents::new(252_50));
        assert_eq!(report.by_category[0].total, MoneyCents::new(176_41));
    }

    #[test]
    fn equal_totals_are_ordered_by_category() {
        let records = vec![
            expense("a", "Wash", date(2024, 1, 1), 10, ""),
            expense("b", "Bulb", date(2024, 1, 2), 10, ""),
        ];
        let report = report(&records, &TimeWindow::AllTime, date(2024, 1, 3));
        assert_eq!(report.by_category[0].category, "Bulb");
        assert_eq!(report.by_category[1].category, "Wash");
    }

    #[test]
    fn current_month_only_keeps_this_month() {
        let today = date(2024, 3, 20);
        let records = vec![
            expense("a", "Tires", date(2024, 3, 2), 300, ""),
            expense("b", "Tires", date(2024, 3, 31), 100, ""),
            expense("c", "Oil", date(2024, 2, 29), 50, ""),
            expense("d", "Oil", date(2023, 3, 10), 70, ""),
        ];
        let report = report(&records, &TimeWindow::CurrentMonth, today);
        assert_eq!(report.count, 2);
        assert_eq!(report.total, MoneyCents::new(400));
        assert_eq!(report.by_category.len(), 1);
        assert_eq!(report.by_category[0].category, "Tires");
    }

    #[test]
    fn current_year_only_keeps_this_year() {
        let records = sample();
        let report = report(&records, &TimeWindow::CurrentYear, date(2024, 6, 1));
        assert_eq!(report.count, 4);
        assert_eq!(report.total, MoneyCents::new(695_000));
    }

    #[test]
    fn range_is_inclusive_and_needs_both_bounds() {
        let records = sample();
        let today = date(2024, 6, 1);
        let window = TimeWindow::Range {
            from: Some(date(2024, 1, 10)),
            to: Some(date(2024, 3, 2)),
        };
        let report = report(&records, &window, today);
        assert_eq!(report.count, 3);
        assert_eq!(report.total, MoneyCents::new(395_000));

        let open = TimeWindow::Range {
            from: Some(date(2024, 1, 10)),
            to: None,
        };
        assert_eq!(super::report(&records, &open, today).count, records.len());

        let inverted = TimeWindow::Range {
            from: Some(date(2024, 3, 2)),
            to: Some(date(2024, 1, 10)),
        };
        assert_eq!(super::report(&records, &inverted, today).count, 0);
    }
}
