//! Identity provider port and a local, file-backed implementation.
//!
//! The tracker only needs three things from an identity provider: an
//! interactive sign-in, a sign-out and a stream of [`AuthState`] changes.
use core::fmt;
use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::AuthError;

/// Stable owner identifier issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
}

/// Authentication state as published by a provider.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AuthState {
    /// The provider has not resolved the initial session yet.
    #[default]
    Pending,
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    pub fn user(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to auth state changes. The receiver starts at the current
    /// state.
    fn auth_state(&self) -> watch::Receiver<AuthState>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    email: String,
}

/// Identity provider for a single workstation.
///
/// Users sign in with an e-mail address. When `allowed_domains` is not empty
/// only addresses from those domains are accepted. The last session is kept
/// in a JSON file so a restart resolves straight to the signed-in state.
#[derive(Debug)]
pub struct LocalIdentity {
    allowed_domains: Vec<String>,
    session_path: Option<PathBuf>,
    state: watch::Sender<AuthState>,
}

impl LocalIdentity {
    pub fn new(allowed_domains: Vec<String>, session_path: Option<PathBuf>) -> Self {
        let (state, _) = watch::channel(AuthState::Pending);
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|domain| domain.trim().to_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
            session_path,
            state,
        }
    }

    /// Resolve the initial state from the session file.
    ///
    /// A remembered address that is no longer acceptable (for instance after
    /// the allow-list changed) resolves to signed out.
    pub async fn restore(&self) -> Result<(), AuthError> {
        let remembered = match &self.session_path {
            Some(path) => read_session(path)?,
            None => None,
        };

        let next = match remembered {
            Some(email) => match self.identify(&email) {
                Ok(identity) => {
                    tracing::info!("restored session for {}", identity.email);
                    AuthState::SignedIn(identity)
                }
                Err(err) => {
                    tracing::warn!("discarding remembered session: {err}");
                    AuthState::SignedOut
                }
            },
            None => AuthState::SignedOut,
        };
        self.state.send_replace(next);
        Ok(())
    }

    fn identify(&self, email: &str) -> Result<Identity, AuthError> {
        let email = email.trim().to_lowercase();
        let Some((local, domain)) = email.split_once('@') else {
            return Err(AuthError::Rejected(format!(
                "\"{email}\" is not an e-mail address"
            )));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(AuthError::Rejected(format!(
                "\"{email}\" is not an e-mail address"
            )));
        }
        if !self.allowed_domains.is_empty() && !self.allowed_domains.iter().any(|d| d == domain)
        {
            return Err(AuthError::DomainNotPermitted {
                domain: domain.to_string(),
            });
        }

        let uid = Uuid::new_v5(&Uuid::NAMESPACE_OID, email.as_bytes());
        Ok(Identity {
            uid: UserId::new(uid.to_string()),
            email,
        })
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = self.identify(&credentials.email)?;
        if let Some(path) = &self.session_path {
            write_session(path, &identity.email)?;
        }
        tracing::info!("signed in as {}", identity.email);
        self.state
            .send_replace(AuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(path) = &self.session_path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(AuthError::Provider(err.to_string())),
            }
        }
        tracing::info!("signed out");
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

fn read_session(path: &Path) -> Result<Option<String>, AuthError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AuthError::Provider(err.to_string())),
    };
    let session: SessionFile =
        serde_json::from_str(&content).map_err(|err| AuthError::Provider(err.to_string()))?;
    Ok(Some(session.email))
}

fn write_session(path: &Path, email: &str) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| AuthError::Provider(err.to_string()))?;
    }
    let payload = serde_json::to_string_pretty(&SessionFile {
        email: email.to_string(),
    })
    .map_err(|err| AuthError::Provider(err.to_string()))?;
    fs::write(path, payload).map_err(|err| AuthError::Provider(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(email: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn starts_pending_until_restored() {
        let provider = LocalIdentity::new(Vec::new(), None);
        let rx = provider.auth_state();
        assert_eq!(*rx.borrow(), AuthState::Pending);

        provider.restore().await.unwrap();
        assert_eq!(*provider.auth_state().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn user_ids_are_stable_per_address() {
        let provider = LocalIdentity::new(Vec::new(), None);
        let a = provider.sign_in(&credentials("Rider@Mail.com")).await.unwrap();
        let b = provider.sign_in(&credentials("rider@mail.com ")).await.unwrap();
        assert_eq!(a.uid, b.uid);
        assert_eq!(a.email, "rider@mail.com");
    }

    #[tokio::test]
    async fn foreign_domains_are_refused() {
        let provider = LocalIdentity::new(vec!["garage.co".to_string()], None);
        let err = provider
            .sign_in(&credentials("rider@mail.com"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::DomainNotPermitted {
                domain: "mail.com".to_string()
            }
        );
        assert!(provider.sign_in(&credentials("rider@garage.co")).await.is_ok());
    }

    #[tokio::test]
    async fn malformed_addresses_are_rejected() {
        let provider = LocalIdentity::new(Vec::new(), None);
        for email in ["rider", "@mail.com", "rider@", "a@b@c"] {
            assert!(matches!(
                provider.sign_in(&credentials(email)).await,
                Err(AuthError::Rejected(_))
            ));
        }
    }

    #[tokio::test]
    async fn session_file_survives_restart_and_sign_out_clears_it() {
        let path = std::env::temp_dir().join(format!("motolog_session_{}.json", Uuid::new_v4()));

        let provider = LocalIdentity::new(Vec::new(), Some(path.clone()));
        let identity = provider.sign_in(&credentials("rider@mail.com")).await.unwrap();

        let restarted = LocalIdentity::new(Vec::new(), Some(path.clone()));
        restarted.restore().await.unwrap();
        assert_eq!(
            *restarted.auth_state().borrow(),
            AuthState::SignedIn(identity)
        );

        restarted.sign_out().await.unwrap();
        assert!(!path.exists());
        assert_eq!(*restarted.auth_state().borrow(), AuthState::SignedOut);
    }
}
