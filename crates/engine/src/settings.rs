//! Per-user settings: the display name of the tracked motorcycle.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Label shown until the user picks a name of their own.
pub const DEFAULT_DISPLAY_NAME: &str = "My Motorcycle";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub owner: UserId,
    pub display_name: String,
}

/// Partial settings document for create-or-merge writes. `None` fields are
/// left untouched in the stored document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub display_name: Option<String>,
}

impl SettingsPatch {
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }

    /// Merge the patch into an existing document.
    pub fn apply_to(&self, settings: &mut UserSettings) {
        if let Some(name) = &self.display_name {
            settings.display_name = name.clone();
        }
    }

    /// Build the document created by the first merge for `owner`.
    pub fn into_settings(self, owner: UserId) -> UserSettings {
        UserSettings {
            owner,
            display_name: self
                .display_name
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    pub display_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserSettings {
    fn from(model: Model) -> Self {
        Self {
            owner: UserId::new(model.owner_id),
            display_name: model.display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut settings = UserSettings {
            owner: UserId::new("u1"),
            display_name: "Tenere".to_string(),
        };
        SettingsPatch::default().apply_to(&mut settings);
        assert_eq!(settings.display_name, "Tenere");

        SettingsPatch::display_name("Africa Twin").apply_to(&mut settings);
        assert_eq!(settings.display_name, "Africa Twin");
    }

    #[test]
    fn first_merge_falls_back_to_default_name() {
        let settings = SettingsPatch::default().into_settings(UserId::new("u1"));
        assert_eq!(settings.display_name, DEFAULT_DISPLAY_NAME);
    }
}
