//! Which screen is showing, and which record is being edited.
use crate::{Expense, ExpenseId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Dashboard,
    Add,
    Edit(ExpenseId),
    Reports,
}

/// `View` without the edit target, for code that only cares about the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Add,
    Edit,
    Reports,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Add => "New entry",
            Self::Edit => "Edit entry",
            Self::Reports => "Reports",
        }
    }
}

/// The screen state machine.
///
/// The edit target is stored inside [`View::Edit`], so "editing" and "has an
/// edit target" can never disagree. [`ViewState::revalidate`] must run after
/// every dataset snapshot to drop targets that disappeared remotely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    current: View,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &View {
        &self.current
    }

    pub fn screen(&self) -> Screen {
        match self.current {
            View::Dashboard => Screen::Dashboard,
            View::Add => Screen::Add,
            View::Edit(_) => Screen::Edit,
            View::Reports => Screen::Reports,
        }
    }

    pub fn editing_id(&self) -> Option<&ExpenseId> {
        match &self.current {
            View::Edit(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_form_open(&self) -> bool {
        matches!(self.current, View::Add | View::Edit(_))
    }

    /// `dashboard → add`. Returns `false` from any other screen.
    pub fn start_new(&mut self) -> bool {
        if self.current != View::Dashboard {
            return false;
        }
        self.current = View::Add;
        true
    }

    /// Any screen `→ edit(id)`, provided `id` is one of `records`.
    pub fn edit(&mut self, id: &ExpenseId, records: &[Expense]) -> bool {
        if !records.iter().any(|expense| &expense.id == id) {
            return false;
        }
        self.current = View::Edit(id.clone());
        true
    }

    /// `add|edit → dashboard`. Other screens are left alone.
    pub fn close_form(&mut self) {
        if self.is_form_open() {
            self.current = View::Dashboard;
        }
    }

    pub fn show_reports(&mut self) -> bool {
        if self.current != View::Dashboard {
            return false;
        }
        self.current = View::Reports;
        true
    }

    pub fn show_dashboard(&mut self) -> bool {
        if self.current != View::Reports {
            return false;
        }
        self.current = View::Dashboard;
        true
    }

    /// Leave `edit(id)` when `id` is no longer among `records`.
    ///
    /// Returns `true` when the view was forced back to the dashboard.
    pub fn revalidate(&mut self, records: &[Expense]) -> bool {
        let stale = match &self.current {
            View::Edit(id) => !records.iter().any(|expense| &expense.id == id),
            _ => false,
        };
        if stale {
            tracing::debug!("edit target vanished, returning to dashboard");
            self.current = View::Dashboard;
        }
        stale
    }

    pub fn reset(&mut self) {
        self.current = View::Dashboard;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{MoneyCents, UserId};

    fn records(ids: &[&str]) -> Vec<Expense> {
        ids.iter()
            .map(|id| Expense {
                id: ExpenseId::new(*id),
                owner: UserId::new("u1"),
                category: "Chain".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                amount: MoneyCents::new(10_00),
                note: String::new(),
                created_at: 0,
            })
            .collect()
    }

    #[test]
    fn starts_on_dashboard() {
        let view = ViewState::new();
        assert_eq!(view.current(), &View::Dashboard);
        assert!(view.editing_id().is_none());
    }

    #[test]
    fn add_only_from_dashboard() {
        let mut view = ViewState::new();
        assert!(view.show_reports());
        assert!(!view.start_new());
        assert!(view.show_dashboard());
        assert!(view.start_new());
        assert_eq!(view.screen(), Screen::Add);
        view.close_form();
        assert_eq!(view.current(), &View::Dashboard);
    }

    #[test]
    fn edit_requires_a_present_record() {
        let data = records(&["a", "b"]);
        let mut view = ViewState::new();
        assert!(!view.edit(&ExpenseId::new("zz"), &data));
        assert_eq!(view.current(), &View::Dashboard);

        assert!(view.edit(&ExpenseId::new("b"), &data));
        assert_eq!(view.editing_id(), Some(&ExpenseId::new("b")));
    }

    #[test]
    fn edit_is_reachable_from_any_screen() {
        let data = records(&["a"]);
        let mut view = ViewState::new();
        view.show_reports();
        assert!(view.edit(&ExpenseId::new("a"), &data));

        let mut view = ViewState::new();
        view.start_new();
        assert!(view.edit(&ExpenseId::new("a"), &data));
        assert_eq!(view.screen(), Screen::Edit);
    }

    #[test]
    fn revalidate_drops_vanished_targets_only() {
        let mut view = ViewState::new();
        let data = records(&["a", "b"]);
        view.edit(&ExpenseId::new("a"), &data);

        assert!(!view.revalidate(&data));
        assert_eq!(view.editing_id(), Some(&ExpenseId::new("a")));

        assert!(view.revalidate(&records(&["b"])));
        assert_eq!(view.current(), &View::Dashboard);
        assert!(view.editing_id().is_none());
    }

    #[test]
    fn revalidate_leaves_other_screens_alone() {
        let mut view = ViewState::new();
        view.start_new();
        assert!(!view.revalidate(&[]));
        assert_eq!(view.current(), &View::Add);

        let mut view = ViewState::new();
        view.show_reports();
        assert!(!view.revalidate(&[]));
        assert_eq!(view.current(), &View::Reports);
    }
}
