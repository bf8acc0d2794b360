//! Turns user intents into document store writes.
//!
//! The gateway is the only place that writes. It validates before touching
//! the store and never inserts anything locally: new and updated records show
//! up once the live subscription delivers them.
use std::sync::Arc;

use chrono::Utc;

use crate::{
    Draft, DocumentStore, EngineError, ExpenseFields, ExpenseId, SettingsPatch, UserId,
    ValidationError, store::NewExpense,
};

type ResultGateway<T> = Result<T, EngineError>;

/// Outcome of a successful [`MutationGateway::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Saved {
    Created(ExpenseId),
    Updated(ExpenseId),
}

impl Saved {
    pub fn id(&self) -> &ExpenseId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

#[derive(Clone)]
pub struct MutationGateway {
    store: Arc<dyn DocumentStore>,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create or update, depending on the draft.
    pub async fn save(&self, owner: &UserId, draft: Draft) -> ResultGateway<Saved> {
        match draft {
            Draft::New(draft) => self.create(owner, draft.fields).await.map(Saved::Created),
            Draft::Existing(patch) => {
                self.update(owner, &patch.id, &patch.fields).await?;
                Ok(Saved::Updated(patch.id))
            }
        }
    }

    /// Store a new expense for `owner`, stamped with the current time.
    pub async fn create(&self, owner: &UserId, fields: ExpenseFields) -> ResultGateway<ExpenseId> {
        fields.check()?;
        let expense = NewExpense {
            owner: owner.clone(),
            fields,
            created_at: Utc::now().timestamp_millis(),
        };
        match self.store.create_expense(expense).await {
            Ok(id) => {
                tracing::info!("created expense {id} for {owner}");
                Ok(id)
            }
            Err(err) => {
                tracing::error!("creating expense for {owner} failed: {err}");
                Err(err.into())
            }
        }
    }

    /// Replace category, date, amount and note of `id`.
    pub async fn update(
        &self,
        owner: &UserId,
        id: &ExpenseId,
        fields: &ExpenseFields,
    ) -> ResultGateway<()> {
        fields.check()?;
        self.store
            .update_expense(owner, id, fields)
            .await
            .inspect(|_| tracing::info!("updated expense {id}"))
            .inspect_err(|err| tracing::error!("updating expense {id} failed: {err}"))?;
        Ok(())
    }

    pub async fn delete(&self, owner: &UserId, id: &ExpenseId) -> ResultGateway<()> {
        self.store
            .delete_expense(owner, id)
            .await
            .inspect(|_| tracing::info!("deleted expense {id}"))
            .inspect_err(|err| tracing::error!("deleting expense {id} failed: {err}"))?;
        Ok(())
    }

    /// Create-or-merge the display name. The caller applies the name locally
    /// before awaiting this.
    pub async fn rename(&self, owner: &UserId, name: &str) -> ResultGateway<()> {
        let name = normalize_display_name(name)?;
        self.store
            .merge_settings(owner, SettingsPatch::display_name(name))
            .await
            .inspect_err(|err| tracing::error!("renaming for {owner} failed: {err}"))?;
        Ok(())
    }
}

/// Trim a display name, rejecting blank ones.
pub fn normalize_display_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyDisplayName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{ExistingRecordPatch, MemoryStore, MoneyCents, NewRecordDraft, StoreError};

    fn fields(category: &str, cents: i64) -> ExpenseFields {
        ExpenseFields {
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            amount: MoneyCents::new(cents),
            note: String::new(),
        }
    }

    fn setup() -> (Arc<MemoryStore>, MutationGateway) {
        let store = Arc::new(MemoryStore::new());
        let gateway = MutationGateway::new(store.clone());
        (store, gateway)
    }

    #[tokio::test]
    async fn create_stamps_owner_and_time() {
        let (store, gateway) = setup();
        let owner = UserId::new("u1");
        let before = Utc::now().timestamp_millis();

        let saved = gateway
            .save(
                &owner,
                Draft::New(NewRecordDraft {
                    fields: fields("Oil change", 50_000_00),
                }),
            )
            .await
            .unwrap();

        let stored = store.all_expenses();
        assert_eq!(stored.len(), 1);
        assert_eq!(&stored[0].id, saved.id());
        assert_eq!(stored[0].owner, owner);
        assert!(stored[0].created_at >= before);
    }

    #[tokio::test]
    async fn update_keeps_identity_fields() {
        let (store, gateway) = setup();
        let owner = UserId::new("u1");
        let id = gateway
            .create(&owner, fields("Oil change", 50_000))
            .await
            .unwrap();
        let created_at = store.all_expenses()[0].created_at;

        gateway
            .save(
                &owner,
                Draft::Existing(ExistingRecordPatch {
                    id: id.clone(),
                    fields: fields("Oil + filter", 65_000),
                }),
            )
            .await
            .unwrap();

        let stored = &store.all_expenses()[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.owner, owner);
        assert_eq!(stored.created_at, created_at);
        assert_eq!(stored.category, "Oil + filter");
        assert_eq!(stored.amount, MoneyCents::new(65_000_00));
    }

    #[tokio::test]
    async fn malformed_fields_never_reach_the_store() {
        let (store, gateway) = setup();
        let owner = UserId::new("u1");
        let err = gateway.create(&owner, fields("  ", 1)).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::MissingCategory)
        );
        let err = gateway
            .create(&owner, fields("Chain", -1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(store.all_expenses().is_empty());
    }

    #[tokio::test]
    async fn foreign_records_are_refused() {
        let (_store, gateway) = setup();
        let id = gateway
            .create(&UserId::new("u1"), fields("Chain", 1))
            .await
            .unwrap();
        let err = gateway.delete(&UserId::new("u2"), &id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Write(StoreError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn rename_trims_and_rejects_blank_names() {
        let (store, gateway) = setup();
        let owner = UserId::new("u1");
        assert_eq!(
            gateway.rename(&owner, "   ").await,
            Err(EngineError::Validation(ValidationError::EmptyDisplayName))
        );
        assert!(store.settings_of(&owner).is_none());

        gateway.rename(&owner, " My Bike ").await.unwrap();
        assert_eq!(store.settings_of(&owner).unwrap().display_name, "My Bike");
    }

    #[tokio::test]
    async fn store_failures_become_write_errors() {
        let (store, gateway) = setup();
        store.set_unavailable(Some("offline"));
        let err = gateway
            .create(&UserId::new("u1"), fields("Chain", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Write(StoreError::Unavailable(_))));
    }
}
