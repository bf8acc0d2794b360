//! Core of the motorcycle maintenance tracker.
//!
//! [`Tracker`] ties everything together: it follows the identity provider,
//! keeps the signed-in user's expenses live, holds the screen state and
//! routes every write through the [`MutationGateway`]. The derived views in
//! [`views`] are pure functions over the current records.
pub use dataset::LiveDataset;
pub use error::{AuthError, EngineError, StoreError, ValidationError};
pub use expense::{
    Draft, ExistingRecordPatch, Expense, ExpenseFields, ExpenseForm, ExpenseId, NewRecordDraft,
};
pub use gateway::{MutationGateway, Saved};
pub use identity::{AuthState, Credentials, Identity, IdentityProvider, LocalIdentity, UserId};
pub use listener::ListenerHandle;
pub use money::MoneyCents;
pub use runtime::{Context, ContextBuilder, Event, Notice, NoticeLevel, Tracker};
pub use session::{SessionChange, SessionMonitor};
pub use settings::{DEFAULT_DISPLAY_NAME, SettingsPatch, UserSettings};
pub use store::{DocumentStore, MemoryStore, NewExpense, Snapshot, SqlStore};
pub use view_state::{Screen, View, ViewState};
pub use views::{CategoryTotal, Report, TimeWindow};

mod dataset;
mod error;
pub mod expense;
mod gateway;
mod identity;
mod listener;
pub mod money;
mod runtime;
mod session;
pub mod settings;
pub mod store;
mod view_state;
pub mod views;
