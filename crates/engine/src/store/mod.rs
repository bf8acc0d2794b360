//! Document store port and its adapters.
//!
//! A store persists expenses and user settings and publishes full
//! replacement snapshots of a user's data whenever it changes. Snapshots are
//! delivered through `tokio::sync::watch` channels: a late reader only ever
//! sees the newest result set, which is all a full-replacement consumer
//! needs.
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{Expense, ExpenseFields, ExpenseId, SettingsPatch, StoreError, UserId, UserSettings};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

/// A point-in-time result of a live query, or the error that replaced it.
pub type Snapshot<T> = Result<T, StoreError>;

/// Everything written when a record is created.
#[derive(Clone, Debug, PartialEq)]
pub struct NewExpense {
    pub owner: UserId,
    pub fields: ExpenseFields,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Live query over every expense owned by `owner`.
    ///
    /// The store may order the result set; consumers must not rely on it.
    async fn watch_expenses(
        &self,
        owner: &UserId,
    ) -> Result<watch::Receiver<Snapshot<Vec<Expense>>>, StoreError>;

    /// Live view of the settings document keyed by `owner`.
    async fn watch_settings(
        &self,
        owner: &UserId,
    ) -> Result<watch::Receiver<Snapshot<Option<UserSettings>>>, StoreError>;

    async fn create_expense(&self, expense: NewExpense) -> Result<ExpenseId, StoreError>;

    /// Replace the user-editable fields of an expense owned by `owner`.
    async fn update_expense(
        &self,
        owner: &UserId,
        id: &ExpenseId,
        fields: &ExpenseFields,
    ) -> Result<(), StoreError>;

    async fn delete_expense(&self, owner: &UserId, id: &ExpenseId) -> Result<(), StoreError>;

    /// Create the settings document or merge `patch` into it.
    async fn merge_settings(&self, owner: &UserId, patch: SettingsPatch) -> Result<(), StoreError>;
}

/// Per-owner snapshot publishers shared by the store adapters.
pub(crate) struct Feeds<T> {
    senders: Mutex<HashMap<UserId, watch::Sender<Snapshot<T>>>>,
}

impl<T> Default for Feeds<T> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> Feeds<T> {
    fn lock_pruned(&self) -> MutexGuard<'_, HashMap<UserId, watch::Sender<Snapshot<T>>>> {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders.retain(|owner, sender| {
            let watched = sender.receiver_count() > 0;
            if !watched {
                tracing::debug!("closing idle feed for {owner}");
            }
            watched
        });
        senders
    }

    /// Subscribe to an already open feed.
    pub(crate) fn existing(&self, owner: &UserId) -> Option<watch::Receiver<Snapshot<T>>> {
        self.lock_pruned()
            .get(owner)
            .map(watch::Sender::subscribe)
    }

    /// Subscribe to the feed of `owner` starting at `initial`, opening the
    /// feed when none exists yet. Feeds nobody listens to anymore are closed
    /// on the way.
    pub(crate) fn subscribe(
        &self,
        owner: &UserId,
        initial: Snapshot<T>,
    ) -> watch::Receiver<Snapshot<T>> {
        let mut senders = self.lock_pruned();
        if let Some(sender) = senders.get(owner) {
            sender.send_replace(initial);
            return sender.subscribe();
        }
        let (sender, receiver) = watch::channel(initial);
        senders.insert(owner.clone(), sender);
        receiver
    }

    pub(crate) fn is_watched(&self, owner: &UserId) -> bool {
        self.lock_pruned().contains_key(owner)
    }

    /// Push a new snapshot to every reader of `owner`'s feed.
    pub(crate) fn publish(&self, owner: &UserId, snapshot: Snapshot<T>) {
        if let Some(sender) = self.lock_pruned().get(owner) {
            sender.send_replace(snapshot);
        }
    }

    /// Number of open feeds.
    #[cfg(test)]
    fn open_feeds(&self) -> usize {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_existing_readers() {
        let feeds: Feeds<u32> = Feeds::default();
        let owner = UserId::new("u1");
        let mut rx = feeds.subscribe(&owner, Ok(1));
        assert_eq!(*rx.borrow_and_update(), Ok(1));

        feeds.publish(&owner, Ok(2));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Ok(2));

        let late = feeds.existing(&owner).unwrap();
        assert_eq!(*late.borrow(), Ok(2));
    }

    #[test]
    fn idle_feeds_are_closed_on_publish() {
        let feeds: Feeds<u32> = Feeds::default();
        let owner = UserId::new("u1");
        drop(feeds.subscribe(&owner, Ok(1)));

        feeds.publish(&owner, Ok(2));
        assert!(!feeds.is_watched(&owner));
        assert!(feeds.existing(&owner).is_none());
    }

    #[test]
    fn feeds_of_departed_owners_are_closed_when_others_subscribe() {
        let feeds: Feeds<u32> = Feeds::default();
        for session in 0..5 {
            let owner = UserId::new(format!("u{session}"));
            let rx = feeds.subscribe(&owner, Ok(session));
            assert_eq!(*rx.borrow(), Ok(session));
            drop(rx);
        }
        assert_eq!(feeds.open_feeds(), 1);

        let kept = feeds.subscribe(&UserId::new("kept"), Ok(0));
        assert_eq!(feeds.open_feeds(), 1);
        assert!(feeds.is_watched(&UserId::new("kept")));
        drop(kept);
    }
}
