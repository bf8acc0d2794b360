//! The tracker: one owner for session, dataset, view state and writes.
//!
//! Auth changes and store snapshots arrive as [`Event`]s on a single queue and
//! are applied in arrival order by whoever drives the tracker (the terminal
//! loop, or a test). User intents are plain method calls. Nothing else
//! mutates tracker state, so no locking is needed.
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    AuthError, AuthState, Credentials, Draft, EngineError, ExistingRecordPatch, Expense,
    ExpenseForm, ExpenseId, IdentityProvider, NewRecordDraft, UserId, UserSettings,
    ValidationError,
    dataset::LiveDataset,
    gateway::{MutationGateway, Saved, normalize_display_name},
    session::{SessionChange, SessionMonitor},
    store::{DocumentStore, Snapshot},
    view_state::{View, ViewState},
};

type ResultTracker<T> = Result<T, EngineError>;

/// Something that happened outside the tracker.
#[derive(Clone, Debug)]
pub enum Event {
    Auth(AuthState),
    Expenses {
        generation: u64,
        snapshot: Snapshot<Vec<Expense>>,
    },
    Settings {
        generation: u64,
        snapshot: Snapshot<Option<UserSettings>>,
    },
}

/// The external services the tracker talks to, built once at startup.
#[derive(Clone)]
pub struct Context {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl Context {
    /// Return a builder for `Context`.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    identity: Option<Arc<dyn IdentityProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
}

impl ContextBuilder {
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> ContextBuilder {
        self.identity = Some(identity);
        self
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> ContextBuilder {
        self.store = Some(store);
        self
    }

    /// Construct `Context`. Both services are required.
    pub fn build(self) -> ResultTracker<Context> {
        Ok(Context {
            identity: self
                .identity
                .ok_or_else(|| EngineError::KeyNotFound("identity provider".to_string()))?,
            store: self
                .store
                .ok_or_else(|| EngineError::KeyNotFound("document store".to_string()))?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A one-off message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub struct Tracker {
    context: Context,
    gateway: MutationGateway,
    session: SessionMonitor,
    dataset: LiveDataset,
    view: ViewState,
    pending_delete: Option<ExpenseId>,
    notice: Option<Notice>,
    form_error: Option<ValidationError>,
    auth_error: Option<AuthError>,
    sink: mpsc::UnboundedSender<Event>,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Tracker {
    /// Subscribe to the identity provider and return an idle tracker.
    ///
    /// Must be called from within a tokio runtime. Nothing is applied until
    /// the caller starts feeding events with [`Tracker::pump`] or
    /// [`Tracker::process_next`].
    pub fn start(context: Context) -> Self {
        let (sink, events) = mpsc::unbounded_channel();
        let session = SessionMonitor::start(context.identity.as_ref(), sink.clone());
        Self {
            gateway: MutationGateway::new(context.store.clone()),
            context,
            session,
            dataset: LiveDataset::new(),
            view: ViewState::new(),
            pending_delete: None,
            notice: None,
            form_error: None,
            auth_error: None,
            sink,
            events,
        }
    }

    pub fn session(&self) -> &SessionMonitor {
        &self.session
    }

    pub fn dataset(&self) -> &LiveDataset {
        &self.dataset
    }

    pub fn view(&self) -> &View {
        self.view.current()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn pending_delete(&self) -> Option<&ExpenseId> {
        self.pending_delete.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn form_error(&self) -> Option<&ValidationError> {
        self.form_error.as_ref()
    }

    pub fn auth_error(&self) -> Option<&AuthError> {
        self.auth_error.as_ref()
    }

    /// The record under edit, when the edit screen is showing.
    pub fn editing(&self) -> Option<&Expense> {
        self.view
            .editing_id()
            .and_then(|id| self.dataset.get(id))
    }

    /// Apply every event already queued. Returns how many were applied.
    pub async fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event).await;
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle(event).await;
                true
            }
            None => false,
        }
    }

    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Auth(state) => self.on_auth(state).await,
            Event::Expenses {
                generation,
                snapshot,
            } => {
                if self.dataset.apply_expenses(generation, snapshot) {
                    self.view.revalidate(self.dataset.records());
                    if let Some(id) = &self.pending_delete
                        && !self.dataset.contains(id)
                    {
                        self.pending_delete = None;
                    }
                }
            }
            Event::Settings {
                generation,
                snapshot,
            } => {
                self.dataset.apply_settings(generation, snapshot);
            }
        }
    }

    async fn on_auth(&mut self, state: AuthState) {
        match self.session.apply(state) {
            SessionChange::Unchanged => {}
            SessionChange::SignedIn(identity) => {
                tracing::info!("session started for {}", identity.email);
                self.reset_local_state();
                self.auth_error = None;
                let store = self.context.store.clone();
                if let Err(err) = self
                    .dataset
                    .attach(store.as_ref(), identity.uid, self.sink.clone())
                    .await
                {
                    tracing::error!("could not subscribe to the dataset: {err}");
                    self.notice = Some(Notice::error(format!("Could not load your data: {err}")));
                }
            }
            SessionChange::SignedOut => {
                tracing::info!("session ended");
                self.dataset.detach();
                self.reset_local_state();
            }
        }
    }

    fn reset_local_state(&mut self) {
        self.view.reset();
        self.pending_delete = None;
        self.form_error = None;
    }

    fn owner(&self) -> ResultTracker<UserId> {
        self.session
            .current_user()
            .map(|identity| identity.uid.clone())
            .ok_or(EngineError::NotAuthenticated)
    }

    pub async fn sign_in(&mut self, email: &str) -> ResultTracker<()> {
        let credentials = Credentials {
            email: email.to_string(),
        };
        match self.context.identity.sign_in(&credentials).await {
            Ok(_) => {
                self.auth_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("sign-in failed: {err}");
                self.auth_error = Some(err.clone());
                Err(err.into())
            }
        }
    }

    /// Sign out and drop the local dataset straight away, without waiting
    /// for the provider to echo the change.
    pub async fn sign_out(&mut self) -> ResultTracker<()> {
        if let Err(err) = self.context.identity.sign_out().await {
            tracing::error!("sign-out failed: {err}");
            self.notice = Some(Notice::error(format!("Could not sign out: {err}")));
            return Err(err.into());
        }
        self.on_auth(AuthState::SignedOut).await;
        self.notice = Some(Notice::info("Signed out"));
        Ok(())
    }

    pub fn new_entry(&mut self) -> bool {
        self.form_error = None;
        self.view.start_new()
    }

    pub fn edit(&mut self, id: &ExpenseId) -> ResultTracker<()> {
        if !self.view.edit(id, self.dataset.records()) {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        self.form_error = None;
        Ok(())
    }

    /// Leave the form without saving.
    pub fn cancel(&mut self) {
        self.view.close_form();
        self.pending_delete = None;
        self.form_error = None;
    }

    pub fn show_reports(&mut self) -> bool {
        self.view.show_reports()
    }

    pub fn show_dashboard(&mut self) -> bool {
        self.view.show_dashboard()
    }

    /// Validate the open form and create or update accordingly.
    ///
    /// On success the form closes. On failure the form stays open with the
    /// error recorded, so the user can fix it and retry.
    pub async fn submit(&mut self, form: &ExpenseForm) -> ResultTracker<Saved> {
        let owner = self.owner()?;
        let fields = match form.validate() {
            Ok(fields) => fields,
            Err(err) => {
                self.form_error = Some(err.clone());
                return Err(err.into());
            }
        };
        let draft = match self.view.current() {
            View::Add => Draft::New(NewRecordDraft { fields }),
            View::Edit(id) => Draft::Existing(ExistingRecordPatch {
                id: id.clone(),
                fields,
            }),
            View::Dashboard | View::Reports => return Err(EngineError::NoOpenForm),
        };

        match self.gateway.save(&owner, draft).await {
            Ok(saved) => {
                self.form_error = None;
                self.view.close_form();
                self.notice = Some(Notice::success(match saved {
                    Saved::Created(_) => "Expense added",
                    Saved::Updated(_) => "Expense updated",
                }));
                Ok(saved)
            }
            Err(err) => {
                self.notice = Some(Notice::error(format!("Could not save: {err}")));
                Err(err)
            }
        }
    }

    /// First step of a delete: remember `id` until the user confirms.
    pub fn request_delete(&mut self, id: &ExpenseId) -> ResultTracker<()> {
        if !self.dataset.contains(id) {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        self.pending_delete = Some(id.clone());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> ResultTracker<ExpenseId> {
        let id = self
            .pending_delete
            .take()
            .ok_or(EngineError::NoPendingDelete)?;
        let owner = self.owner()?;

        match self.gateway.delete(&owner, &id).await {
            Ok(()) => {
                if self.view.editing_id() == Some(&id) {
                    self.view.close_form();
                }
                self.notice = Some(Notice::success("Expense deleted"));
                Ok(id)
            }
            Err(err) => {
                self.notice = Some(Notice::error(format!("Could not delete: {err}")));
                Err(err)
            }
        }
    }

    /// Change the display name locally, then persist it.
    ///
    /// A failed write keeps the local name; the next settings snapshot
    /// decides what is shown.
    pub async fn rename(&mut self, name: &str) -> ResultTracker<()> {
        let owner = self.owner()?;
        let name = normalize_display_name(name)?;
        self.dataset.set_display_name(&name);

        if let Err(err) = self.gateway.rename(&owner, &name).await {
            self.notice = Some(Notice::error(format!("Could not save the name: {err}")));
            return Err(err);
        }
        Ok(())
    }

    /// Release every subscription.
    pub fn shutdown(&mut self) {
        self.session.shutdown();
        self.dataset.detach();
        tracing::debug!("tracker shut down");
    }
}
