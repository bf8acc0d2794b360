//! Live dataset: the signed-in user's expenses and settings, kept current by
//! two store subscriptions.
//!
//! Every snapshot replaces the previous collection wholesale. Snapshots are
//! tagged with the generation of the attachment that produced them, so late
//! deliveries from a torn-down subscription (previous user, or before logout)
//! are dropped instead of leaking into the next session.
use tokio::sync::mpsc;

use crate::{
    DEFAULT_DISPLAY_NAME, DocumentStore, Expense, ExpenseId, StoreError, UserId, UserSettings,
    listener::{ListenerHandle, forward},
    runtime::Event,
    store::Snapshot,
    views,
};

#[derive(Debug)]
pub struct LiveDataset {
    owner: Option<UserId>,
    generation: u64,
    records: Vec<Expense>,
    display_name: String,
    expenses_error: Option<StoreError>,
    settings_error: Option<StoreError>,
    listeners: Vec<ListenerHandle>,
}

impl Default for LiveDataset {
    fn default() -> Self {
        Self {
            owner: None,
            generation: 0,
            records: Vec::new(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            expenses_error: None,
            settings_error: None,
            listeners: Vec::new(),
        }
    }
}

impl LiveDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of the current owner, newest first.
    pub fn records(&self) -> &[Expense] {
        &self.records
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.records.iter().find(|expense| &expense.id == id)
    }

    pub fn contains(&self, id: &ExpenseId) -> bool {
        self.get(id).is_some()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// The last subscription failure, if the feed has not recovered since.
    pub fn error(&self) -> Option<&StoreError> {
        self.expenses_error.as_ref().or(self.settings_error.as_ref())
    }

    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Subscribe to `owner`'s expenses and settings, replacing any previous
    /// attachment.
    pub(crate) async fn attach(
        &mut self,
        store: &dyn DocumentStore,
        owner: UserId,
        sink: mpsc::UnboundedSender<Event>,
    ) -> Result<(), StoreError> {
        self.detach();
        let generation = self.generation;
        self.owner = Some(owner.clone());
        tracing::debug!("attaching dataset for {owner} (generation {generation})");

        let expenses = store.watch_expenses(&owner).await.inspect_err(|err| {
            self.expenses_error = Some(err.clone());
        })?;
        self.listeners.push(forward(
            "expenses",
            expenses,
            sink.clone(),
            move |snapshot| Event::Expenses {
                generation,
                snapshot,
            },
        ));

        let settings = store.watch_settings(&owner).await.inspect_err(|err| {
            self.settings_error = Some(err.clone());
        })?;
        self.listeners.push(forward(
            "settings",
            settings,
            sink,
            move |snapshot| Event::Settings {
                generation,
                snapshot,
            },
        ));
        Ok(())
    }

    /// Release both subscriptions and forget everything about the owner.
    pub(crate) fn detach(&mut self) {
        self.listeners.clear();
        self.generation += 1;
        self.owner = None;
        self.records.clear();
        self.display_name = DEFAULT_DISPLAY_NAME.to_string();
        self.expenses_error = None;
        self.settings_error = None;
    }

    /// Apply an expenses snapshot. Returns `false` when it was stale.
    pub(crate) fn apply_expenses(
        &mut self,
        generation: u64,
        snapshot: Snapshot<Vec<Expense>>,
    ) -> bool {
        if !self.is_current(generation) {
            tracing::debug!("dropping stale expenses snapshot (generation {generation})");
            return false;
        }
        match snapshot {
            Ok(mut records) => {
                views::sort_by_date_desc(&mut records);
                self.records = records;
                self.expenses_error = None;
            }
            Err(err) => {
                tracing::error!("expenses subscription failed: {err}");
                self.expenses_error = Some(err);
            }
        }
        true
    }

    /// Apply a settings snapshot. Returns `false` when it was stale.
    ///
    /// A missing document leaves the current name alone: the document is
    /// only created on the first rename.
    pub(crate) fn apply_settings(
        &mut self,
        generation: u64,
        snapshot: Snapshot<Option<UserSettings>>,
    ) -> bool {
        if !self.is_current(generation) {
            tracing::debug!("dropping stale settings snapshot (generation {generation})");
            return false;
        }
        match snapshot {
            Ok(Some(settings)) => {
                if !settings.display_name.trim().is_empty() {
                    self.display_name = settings.display_name;
                }
                self.settings_error = None;
            }
            Ok(None) => {
                self.settings_error = None;
            }
            Err(err) => {
                tracing::error!("settings subscription failed: {err}");
                self.settings_error = Some(err);
            }
        }
        true
    }

    /// Optimistic local rename, ahead of the store confirming it.
    pub(crate) fn set_display_name(&mut self, name: &str) {
        self.display_name = name.to_string();
    }

    fn is_current(&self, generation: u64) -> bool {
        self.owner.is_some() && generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::MoneyCents;

    fn expense(id: &str, day: u32) -> Expense {
        Expense {
            id: ExpenseId::new(id),
            owner: UserId::new("u1"),
            category: "Oil".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            amount: MoneyCents::new(100),
            note: String::new(),
            created_at: 0,
        }
    }

    fn attached() -> LiveDataset {
        let mut dataset = LiveDataset::new();
        dataset.detach();
        dataset.owner = Some(UserId::new("u1"));
        dataset
    }

    #[test]
    fn snapshots_replace_and_resort() {
        let mut dataset = attached();
        let generation = dataset.generation;
        assert!(dataset.apply_expenses(generation, Ok(vec![expense("a", 1), expense("b", 5)])));
        let ids: Vec<_> = dataset.records().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        assert!(dataset.apply_expenses(generation, Ok(vec![expense("c", 2)])));
        assert_eq!(dataset.records().len(), 1);
        assert!(dataset.contains(&ExpenseId::new("c")));
    }

    #[test]
    fn stale_generations_are_ignored() {
        let mut dataset = attached();
        let old = dataset.generation;
        dataset.detach();
        dataset.owner = Some(UserId::new("u2"));

        assert!(!dataset.apply_expenses(old, Ok(vec![expense("a", 1)])));
        assert!(dataset.records().is_empty());
    }

    #[test]
    fn errors_are_kept_until_the_feed_recovers() {
        let mut dataset = attached();
        let generation = dataset.generation;
        dataset.apply_expenses(generation, Ok(vec![expense("a", 1)]));
        dataset.apply_expenses(
            generation,
            Err(StoreError::Unavailable("offline".to_string())),
        );
        assert!(dataset.error().is_some());
        assert_eq!(dataset.records().len(), 1);

        dataset.apply_expenses(generation, Ok(vec![]));
        assert!(dataset.error().is_none());
    }

    #[test]
    fn missing_settings_keep_the_current_name() {
        let mut dataset = attached();
        let generation = dataset.generation;
        dataset.apply_settings(
            generation,
            Ok(Some(UserSettings {
                owner: UserId::new("u1"),
                display_name: "Tenere".to_string(),
            })),
        );
        assert_eq!(dataset.display_name(), "Tenere");
        dataset.apply_settings(generation, Ok(None));
        assert_eq!(dataset.display_name(), "Tenere");
    }

    #[test]
    fn detach_resets_everything() {
        let mut dataset = attached();
        let generation = dataset.generation;
        dataset.apply_expenses(generation, Ok(vec![expense("a", 1)]));
        dataset.set_display_name("Tenere");

        dataset.detach();
        assert!(dataset.records().is_empty());
        assert_eq!(dataset.display_name(), DEFAULT_DISPLAY_NAME);
        assert!(dataset.owner().is_none());
    }
}
