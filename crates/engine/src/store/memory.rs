//! In-process document store.
//!
//! Used by the client when no database is configured and by the test suite.
//! Records come back in insertion order, not by date.
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{DocumentStore, Feeds, NewExpense, Snapshot};
use crate::{Expense, ExpenseFields, ExpenseId, SettingsPatch, StoreError, UserId, UserSettings};

#[derive(Default)]
struct MemoryState {
    expenses: Vec<Expense>,
    settings: HashMap<UserId, UserSettings>,
    next_id: u64,
    unavailable: Option<String>,
}

impl MemoryState {
    fn expenses_of(&self, owner: &UserId) -> Vec<Expense> {
        self.expenses
            .iter()
            .filter(|expense| &expense.owner == owner)
            .cloned()
            .collect()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn owned_index(&self, owner: &UserId, id: &ExpenseId) -> Result<usize, StoreError> {
        let index = self
            .expenses
            .iter()
            .position(|expense| &expense.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if &self.expenses[index].owner != owner {
            return Err(StoreError::PermissionDenied(id.to_string()));
        }
        Ok(index)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    expense_feeds: Feeds<Vec<Expense>>,
    settings_feeds: Feeds<Option<UserSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with [`StoreError::Unavailable`]
    /// until called again with `None`.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.lock().unavailable = reason.map(ToString::to_string);
    }

    /// Replace the expense feed of `owner` with an error, as a broken
    /// listener would.
    pub fn fail_feed(&self, owner: &UserId, reason: &str) {
        self.expense_feeds
            .publish(owner, Err(StoreError::Unavailable(reason.to_string())));
    }

    /// Every stored expense, regardless of owner.
    pub fn all_expenses(&self) -> Vec<Expense> {
        self.lock().expenses.clone()
    }

    pub fn settings_of(&self, owner: &UserId) -> Option<UserSettings> {
        self.lock().settings.get(owner).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Callers hold the state lock, so feeds see writes in commit order.
    fn publish_expenses(&self, state: &MemoryState, owner: &UserId) {
        self.expense_feeds.publish(owner, Ok(state.expenses_of(owner)));
    }

    fn publish_settings(&self, state: &MemoryState, owner: &UserId) {
        let snapshot = state.settings.get(owner).cloned();
        self.settings_feeds.publish(owner, Ok(snapshot));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn watch_expenses(
        &self,
        owner: &UserId,
    ) -> Result<watch::Receiver<Snapshot<Vec<Expense>>>, StoreError> {
        let state = self.lock();
        Ok(self
            .expense_feeds
            .subscribe(owner, Ok(state.expenses_of(owner))))
    }

    async fn watch_settings(
        &self,
        owner: &UserId,
    ) -> Result<watch::Receiver<Snapshot<Option<UserSettings>>>, StoreError> {
        let state = self.lock();
        let initial = state.settings.get(owner).cloned();
        Ok(self.settings_feeds.subscribe(owner, Ok(initial)))
    }

    async fn create_expense(&self, expense: NewExpense) -> Result<ExpenseId, StoreError> {
        let mut state = self.lock();
        state.ensure_available()?;
        state.next_id += 1;
        let id = ExpenseId::new(format!("exp-{}", state.next_id));
        state.expenses.push(Expense {
            id: id.clone(),
            owner: expense.owner.clone(),
            category: expense.fields.category,
            date: expense.fields.date,
            amount: expense.fields.amount,
            note: expense.fields.note,
            created_at: expense.created_at,
        });
        self.publish_expenses(&state, &expense.owner);
        Ok(id)
    }

    async fn update_expense(
        &self,
        owner: &UserId,
        id: &ExpenseId,
        fields: &ExpenseFields,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.ensure_available()?;
        let index = state.owned_index(owner, id)?;
        let expense = &mut state.expenses[index];
        expense.category = fields.category.clone();
        expense.date = fields.date;
        expense.amount = fields.amount;
        expense.note = fields.note.clone();
        self.publish_expenses(&state, owner);
        Ok(())
    }

    async fn delete_expense(&self, owner: &UserId, id: &ExpenseId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.ensure_available()?;
        let index = state.owned_index(owner, id)?;
        state.expenses.remove(index);
        self.publish_expenses(&state, owner);
        Ok(())
    }

    async fn merge_settings(&self, owner: &UserId, patch: SettingsPatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.ensure_available()?;
        match state.settings.get_mut(owner) {
            Some(settings) => patch.apply_to(settings),
            None => {
                let settings = patch.into_settings(owner.clone());
                state.settings.insert(owner.clone(), settings);
            }
        }
        self.publish_settings(&state, owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::MoneyCents;

    fn new_expense(owner: &UserId, cents: i64) -> NewExpense {
        NewExpense {
            owner: owner.clone(),
            fields: ExpenseFields {
                category: "Oil".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                amount: MoneyCents::new(cents),
                note: String::new(),
            },
            created_at: 0,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_leave_the_feed_on_the_latest_state() {
        let store = Arc::new(MemoryStore::new());
        let owner = UserId::new("u1");
        let rx = store.watch_expenses(&owner).await.unwrap();

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let store = store.clone();
                let owner = owner.clone();
                tokio::spawn(async move {
                    for i in 0..25 {
                        store
                            .create_expense(new_expense(&owner, writer * 100 + i))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let published = rx.borrow().clone().unwrap();
        assert_eq!(published.len(), 200);
        assert_eq!(published, store.all_expenses());
    }

    #[tokio::test]
    async fn late_watchers_start_from_the_current_state() {
        let store = MemoryStore::new();
        let owner = UserId::new("u1");
        store.create_expense(new_expense(&owner, 1_00)).await.unwrap();

        let rx = store.watch_expenses(&owner).await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(Vec::len), Ok(1));

        store.create_expense(new_expense(&owner, 2_00)).await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(Vec::len), Ok(2));
    }
}
