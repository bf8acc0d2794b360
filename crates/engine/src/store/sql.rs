//! SQLite-backed document store built on sea-orm.
//!
//! The database has no change notification of its own, so every committed
//! write re-reads the affected owner's data and republishes it on the open
//! feeds. Nothing is published for owners nobody watches. Writes and their
//! refresh run one at a time, so feeds see them in commit order.
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use super::{DocumentStore, Feeds, NewExpense, Snapshot};
use crate::{
    Expense, ExpenseFields, ExpenseId, SettingsPatch, StoreError, UserId, UserSettings, expense,
    settings,
};

pub struct SqlStore {
    database: DatabaseConnection,
    expense_feeds: Feeds<Vec<Expense>>,
    settings_feeds: Feeds<Option<UserSettings>>,
    writes: Mutex<()>,
}

impl SqlStore {
    /// Wrap an already migrated connection.
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            expense_feeds: Feeds::default(),
            settings_feeds: Feeds::default(),
            writes: Mutex::new(()),
        }
    }

    async fn load_expenses(&self, owner: &UserId) -> Snapshot<Vec<Expense>> {
        let models = expense::Entity::find()
            .filter(expense::Column::OwnerId.eq(owner.as_str()))
            .order_by_desc(expense::Column::Date)
            .all(&self.database)
            .await?;
        models.into_iter().map(Expense::try_from).collect()
    }

    async fn load_settings(&self, owner: &UserId) -> Snapshot<Option<UserSettings>> {
        let model = settings::Entity::find_by_id(owner.as_str().to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(UserSettings::from))
    }

    async fn refresh_expenses(&self, owner: &UserId) {
        if !self.expense_feeds.is_watched(owner) {
            return;
        }
        let snapshot = self.load_expenses(owner).await;
        if let Err(err) = &snapshot {
            tracing::error!("failed to reload expenses for {owner}: {err}");
        }
        self.expense_feeds.publish(owner, snapshot);
    }

    async fn refresh_settings(&self, owner: &UserId) {
        if !self.settings_feeds.is_watched(owner) {
            return;
        }
        let snapshot = self.load_settings(owner).await;
        if let Err(err) = &snapshot {
            tracing::error!("failed to reload settings for {owner}: {err}");
        }
        self.settings_feeds.publish(owner, snapshot);
    }

    /// Fetch an expense and check it belongs to `owner`.
    async fn owned_expense(
        &self,
        owner: &UserId,
        id: &ExpenseId,
    ) -> Result<expense::Model, StoreError> {
        let model = expense::Entity::find_by_id(id.as_str().to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if model.owner_id != owner.as_str() {
            return Err(StoreError::PermissionDenied(id.to_string()));
        }
        Ok(model)
    }
}

#[async_trait]
impl DocumentStore for SqlStore {
    async fn watch_expenses(
        &self,
        owner: &UserId,
    ) -> Result<watch::Receiver<Snapshot<Vec<Expense>>>, StoreError> {
        let _writes = self.writes.lock().await;
        if let Some(receiver) = self.expense_feeds.existing(owner) {
            return Ok(receiver);
        }
        let initial = self.load_expenses(owner).await?;
        Ok(self.expense_feeds.subscribe(owner, Ok(initial)))
    }

    async fn watch_settings(
        &self,
        owner: &UserId,
    ) -> Result<watch::Receiver<Snapshot<Option<UserSettings>>>, StoreError> {
        let _writes = self.writes.lock().await;
        if let Some(receiver) = self.settings_feeds.existing(owner) {
            return Ok(receiver);
        }
        let initial = self.load_settings(owner).await?;
        Ok(self.settings_feeds.subscribe(owner, Ok(initial)))
    }

    async fn create_expense(&self, new: NewExpense) -> Result<ExpenseId, StoreError> {
        let id = Uuid::new_v4().to_string();
        let _writes = self.writes.lock().await;
        let mut model = expense::ActiveModel::from(&new.fields);
        model.id = ActiveValue::Set(id.clone());
        model.owner_id = ActiveValue::Set(new.owner.as_str().to_string());
        model.created_at = ActiveValue::Set(new.created_at);
        model.insert(&self.database).await?;

        self.refresh_expenses(&new.owner).await;
        Ok(ExpenseId::new(id))
    }

    async fn update_expense(
        &self,
        owner: &UserId,
        id: &ExpenseId,
        fields: &ExpenseFields,
    ) -> Result<(), StoreError> {
        let _writes = self.writes.lock().await;
        let existing = self.owned_expense(owner, id).await?;
        let mut model = expense::ActiveModel::from(fields);
        model.id = ActiveValue::Unchanged(existing.id);
        model.update(&self.database).await?;

        self.refresh_expenses(owner).await;
        Ok(())
    }

    async fn delete_expense(&self, owner: &UserId, id: &ExpenseId) -> Result<(), StoreError> {
        let _writes = self.writes.lock().await;
        let existing = self.owned_expense(owner, id).await?;
        expense::Entity::delete_by_id(existing.id)
            .exec(&self.database)
            .await?;

        self.refresh_expenses(owner).await;
        Ok(())
    }

    async fn merge_settings(&self, owner: &UserId, patch: SettingsPatch) -> Result<(), StoreError> {
        let _writes = self.writes.lock().await;
        let db_tx = self.database.begin().await?;
        let existing = settings::Entity::find_by_id(owner.as_str().to_string())
            .one(&db_tx)
            .await?;

        match existing {
            Some(model) => {
                let mut merged = UserSettings::from(model);
                patch.apply_to(&mut merged);
                settings::ActiveModel {
                    owner_id: ActiveValue::Unchanged(owner.as_str().to_string()),
                    display_name: ActiveValue::Set(merged.display_name),
                }
                .update(&db_tx)
                .await?;
            }
            None => {
                let created = patch.into_settings(owner.clone());
                settings::ActiveModel {
                    owner_id: ActiveValue::Set(owner.as_str().to_string()),
                    display_name: ActiveValue::Set(created.display_name),
                }
                .insert(&db_tx)
                .await?;
            }
        }
        db_tx.commit().await?;

        self.refresh_settings(owner).await;
        Ok(())
    }
}
