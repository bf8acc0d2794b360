//! Session monitor: the tracker's view of who is signed in.
use tokio::sync::mpsc;

use crate::{
    AuthState, Identity, IdentityProvider,
    listener::{ListenerHandle, forward},
    runtime::Event,
};

/// What an auth state update means for the rest of the tracker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    Unchanged,
    /// A user became present, or a different user replaced the previous one.
    SignedIn(Identity),
    SignedOut,
}

#[derive(Debug)]
pub struct SessionMonitor {
    state: AuthState,
    listener: Option<ListenerHandle>,
}

impl SessionMonitor {
    /// Open the single long-lived subscription to the provider.
    pub(crate) fn start(
        provider: &dyn IdentityProvider,
        sink: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let listener = forward("auth", provider.auth_state(), sink, Event::Auth);
        Self {
            state: AuthState::Pending,
            listener: Some(listener),
        }
    }

    pub fn current_user(&self) -> Option<&Identity> {
        self.state.user()
    }

    /// `true` until the provider resolves the initial session.
    pub fn is_loading(&self) -> bool {
        self.state == AuthState::Pending
    }

    pub(crate) fn apply(&mut self, next: AuthState) -> SessionChange {
        let before = self.state.user().map(|identity| identity.uid.clone());
        let after = next.user().cloned();
        self.state = next;

        match (before, after) {
            (None, Some(identity)) => SessionChange::SignedIn(identity),
            (Some(previous), Some(identity)) if previous != identity.uid => {
                SessionChange::SignedIn(identity)
            }
            (Some(_), None) => SessionChange::SignedOut,
            _ => SessionChange::Unchanged,
        }
    }

    /// Release the provider subscription.
    pub fn shutdown(&mut self) {
        self.listener.take();
    }
}
