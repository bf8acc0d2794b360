//! Screen-local state of the terminal client: text being typed, selections
//! and dialogs. Everything that must survive a redraw but is not part of the
//! tracker lives here.
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use engine::{Expense, ExpenseForm, Notice, TimeWindow};

const TOAST_TTL: Duration = Duration::from_secs(3);
const MAX_SUGGESTIONS: usize = 5;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default)]
pub struct AppState {
    pub login: LoginState,
    pub dashboard: DashboardState,
    pub form: Option<FormState>,
    pub reports: ReportsState,
    pub confirm_logout: bool,
    pub toast: Option<ToastState>,
}

#[derive(Debug, Default)]
pub struct LoginState {
    pub email: String,
    pub message: Option<String>,
    /// Set when the last failure was a "domain not permitted" rejection.
    pub domain_hint: Option<String>,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub search: String,
    pub searching: bool,
    pub selected: usize,
    /// Name being typed while renaming, `None` when not renaming.
    pub renaming: Option<String>,
}

impl DashboardState {
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Category,
    Date,
    Amount,
    Note,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            Self::Category => Self::Date,
            Self::Date => Self::Amount,
            Self::Amount => Self::Note,
            Self::Note => Self::Category,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Category => Self::Note,
            Self::Date => Self::Category,
            Self::Amount => Self::Date,
            Self::Note => Self::Amount,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Category => "Part / service",
            Self::Date => "Date (YYYY-MM-DD)",
            Self::Amount => "Cost",
            Self::Note => "Notes",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub form: ExpenseForm,
    pub focus: FormField,
}

impl FormState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            form: ExpenseForm::new(today),
            focus: FormField::Category,
        }
    }

    pub fn editing(expense: &Expense) -> Self {
        Self {
            form: ExpenseForm::from(expense),
            focus: FormField::Category,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Category => &self.form.category,
            FormField::Date => &self.form.date,
            FormField::Amount => &self.form.amount,
            FormField::Note => &self.form.note,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Category => &mut self.form.category,
            FormField::Date => &mut self.form.date,
            FormField::Amount => &mut self.form.amount,
            FormField::Note => &mut self.form.note,
        }
    }

    pub fn push(&mut self, ch: char) {
        self.focused_mut().push(ch);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Known categories matching what has been typed so far.
    pub fn suggestions<'a>(&self, known: &'a [String]) -> Vec<&'a str> {
        let typed = self.form.category.trim().to_lowercase();
        if typed.is_empty() {
            return Vec::new();
        }
        known
            .iter()
            .filter(|category| {
                let lower = category.to_lowercase();
                lower.contains(&typed) && lower != typed
            })
            .take(MAX_SUGGESTIONS)
            .map(String::as_str)
            .collect()
    }

    /// Replace the category with the first suggestion. Returns `false` when
    /// there was nothing to accept.
    pub fn accept_suggestion(&mut self, known: &[String]) -> bool {
        let Some(first) = self.suggestions(known).first().map(|s| s.to_string()) else {
            return false;
        };
        self.form.category = first;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowKind {
    #[default]
    AllTime,
    CurrentMonth,
    CurrentYear,
    Range,
}

impl WindowKind {
    pub const ALL: [WindowKind; 4] = [
        WindowKind::AllTime,
        WindowKind::CurrentMonth,
        WindowKind::CurrentYear,
        WindowKind::Range,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    From,
    To,
}

#[derive(Debug, Default)]
pub struct ReportsState {
    pub kind: WindowKind,
    pub from: String,
    pub to: String,
    /// Which range input receives typing. Only used with `WindowKind::Range`.
    pub focus: Option<RangeField>,
}

impl ReportsState {
    /// The window described by the inputs. Bounds that do not parse count
    /// as missing.
    pub fn window(&self) -> TimeWindow {
        match self.kind {
            WindowKind::AllTime => TimeWindow::AllTime,
            WindowKind::CurrentMonth => TimeWindow::CurrentMonth,
            WindowKind::CurrentYear => TimeWindow::CurrentYear,
            WindowKind::Range => TimeWindow::Range {
                from: parse_date(&self.from),
                to: parse_date(&self.to),
            },
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        self.kind = if forward {
            self.kind.next()
        } else {
            self.kind.prev()
        };
        self.focus = (self.kind == WindowKind::Range).then_some(RangeField::From);
    }

    pub fn toggle_focus(&mut self) {
        if self.kind != WindowKind::Range {
            return;
        }
        self.focus = match self.focus {
            Some(RangeField::From) => Some(RangeField::To),
            Some(RangeField::To) | None => Some(RangeField::From),
        };
    }

    pub fn focused_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Some(RangeField::From) => Some(&mut self.from),
            Some(RangeField::To) => Some(&mut self.to),
            None => None,
        }
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub notice: Notice,
    pub shown_at: Instant,
}

impl ToastState {
    pub fn new(notice: Notice) -> Self {
        Self {
            notice,
            shown_at: Instant::now(),
        }
    }

    pub fn expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        ["Chain kit", "Oil change", "Oil filter", "Tires"]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn suggestions_match_case_insensitively() {
        let mut state = FormState::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        state.form.category = "oil".to_string();
        assert_eq!(state.suggestions(&known()), vec!["Oil change", "Oil filter"]);

        state.form.category = "Tires".to_string();
        assert!(state.suggestions(&known()).is_empty());

        state.form.category = "oil".to_string();
        assert!(state.accept_suggestion(&known()));
        assert_eq!(state.form.category, "Oil change");
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut state = FormState::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(state.form.date, "2024-01-01");
        state.focus = FormField::Amount;
        state.push('4');
        state.push('2');
        state.backspace();
        assert_eq!(state.form.amount, "4");
        assert_eq!(state.focus.next(), FormField::Note);
        assert_eq!(FormField::Category.prev(), FormField::Note);
    }

    #[test]
    fn range_window_uses_parsed_bounds() {
        let mut reports = ReportsState::default();
        assert_eq!(reports.window(), TimeWindow::AllTime);

        reports.cycle(false);
        assert_eq!(reports.kind, WindowKind::Range);
        assert_eq!(reports.focus, Some(RangeField::From));
        reports.from = "2024-01-01".to_string();
        reports.to = "not a date".to_string();
        assert_eq!(
            reports.window(),
            TimeWindow::Range {
                from: NaiveDate::from_ymd_opt(2024, 1, 1),
                to: None,
            }
        );

        reports.cycle(true);
        assert_eq!(reports.kind, WindowKind::AllTime);
        assert!(reports.focus.is_none());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut dashboard = DashboardState::default();
        dashboard.select_next(2);
        dashboard.select_next(2);
        assert_eq!(dashboard.selected, 1);
        dashboard.clamp(1);
        assert_eq!(dashboard.selected, 0);
        dashboard.select_prev();
        assert_eq!(dashboard.selected, 0);
    }
}
