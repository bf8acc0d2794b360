//! The module contains the `Expense` record and the types used to author it.
//!
//! Users fill an [`ExpenseForm`] with raw text; validating it yields
//! [`ExpenseFields`], the only shape the gateway accepts for writes. Whether
//! the fields create a record or patch an existing one is carried by
//! [`Draft`].
use core::fmt;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    StoreError, UserId, ValidationError,
    money::{self, MoneyCents},
};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque record identifier assigned by the store on creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A maintenance cost entry.
///
/// `id`, `owner` and `created_at` are assigned once by the store and the
/// gateway; updates only ever touch the remaining fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner: UserId,
    /// Part or service label, e.g. "Oil change".
    pub category: String,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    /// Free text, empty when the user left it blank.
    pub note: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format(DATE_FORMAT),
            self.category,
            money::format_amount(self.amount)
        )
    }
}

/// Validated user-editable fields of an expense.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseFields {
    pub category: String,
    pub date: NaiveDate,
    pub amount: MoneyCents,
    pub note: String,
}

impl ExpenseFields {
    /// Re-check the invariants `ExpenseForm::validate` establishes, for
    /// fields that were built by hand.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if self.amount.is_negative() {
            return Err(ValidationError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Expense> for ExpenseFields {
    fn from(expense: &Expense) -> Self {
        Self {
            category: expense.category.clone(),
            date: expense.date,
            amount: expense.amount,
            note: expense.note.clone(),
        }
    }
}

/// Raw text of the add/edit form, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub category: String,
    pub date: String,
    pub amount: String,
    pub note: String,
}

impl ExpenseForm {
    /// An empty form dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format(DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Check the form and convert it into typed fields.
    ///
    /// Category and date must be present, the date must be a calendar date
    /// and the amount must parse as a non-negative number.
    pub fn validate(&self) -> Result<ExpenseFields, ValidationError> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }

        let date = self.date.trim();
        if date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;

        let amount = money::parse_amount(&self.amount)?;

        Ok(ExpenseFields {
            category: category.to_string(),
            date,
            amount,
            note: self.note.trim().to_string(),
        })
    }
}

impl From<&Expense> for ExpenseForm {
    fn from(expense: &Expense) -> Self {
        Self {
            category: expense.category.clone(),
            date: expense.date.format(DATE_FORMAT).to_string(),
            amount: expense.amount.plain(),
            note: expense.note.clone(),
        }
    }
}

/// Fields for a record that does not exist yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRecordDraft {
    pub fields: ExpenseFields,
}

/// Replacement fields for an existing record.
#[derive(Clone, Debug, PartialEq)]
pub struct ExistingRecordPatch {
    pub id: ExpenseId,
    pub fields: ExpenseFields,
}

/// What a submitted form turns into.
#[derive(Clone, Debug, PartialEq)]
pub enum Draft {
    New(NewRecordDraft),
    Existing(ExistingRecordPatch),
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub category: String,
    pub date: String,
    /// Integer cents.
    pub amount_minor: i64,
    pub note: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&model.date, DATE_FORMAT).map_err(|_| {
            StoreError::Database(format!(
                "expense {} has an invalid date \"{}\"",
                model.id, model.date
            ))
        })?;
        Ok(Self {
            id: ExpenseId::new(model.id),
            owner: UserId::new(model.owner_id),
            category: model.category,
            date,
            amount: MoneyCents::new(model.amount_minor),
            note: model.note,
            created_at: model.created_at,
        })
    }
}

impl From<&ExpenseFields> for ActiveModel {
    /// Only the user-editable columns are set; identity columns stay
    /// `NotSet` so an update can never rewrite them.
    fn from(fields: &ExpenseFields) -> Self {
        Self {
            id: ActiveValue::NotSet,
            owner_id: ActiveValue::NotSet,
            category: ActiveValue::Set(fields.category.clone()),
            date: ActiveValue::Set(fields.date.format(DATE_FORMAT).to_string()),
            amount_minor: ActiveValue::Set(fields.amount.cents()),
            note: ActiveValue::Set(fields.note.clone()),
            created_at: ActiveValue::NotSet,
        }
    }
}
