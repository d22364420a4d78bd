//! Auth context provider — process-wide session state and domain policy.
//!
//! DESIGN
//! ======
//! The provider is an explicitly owned handle (`Arc<AuthProvider>`) passed to
//! routes through `AppState`; there is no ambient global. State changes
//! publish on a watch channel: subscribing is cloning the receiver,
//! deregistering is dropping it. Every session change funnels through
//! `apply_auth_change`, which also re-runs the email-domain policy — so the
//! policy fires immediately after sign-in completes as well as on restore.
//!
//! ERROR HANDLING
//! ==============
//! Session-retrieval failures are logged and treated as "no session".
//! Sign-out failures are logged and leave the state unchanged; nothing here
//! retries or aborts the process.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::{RwLock, watch};
use tracing::{error, warn};

use crate::services::session::{Session, SessionError, SessionStore, SessionUser};

/// Email domains allowed to use the portal.
pub const ALLOWED_EMAIL_DOMAINS: [&str; 2] = ["moe.gov.my", "moe-dl.edu.my"];

const DOMAIN_POLICY_NOTICE: &str = "Your email domain is not allowed. You have been signed out.";

/// Read-only projection of the current auth state, published to subscribers.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub user: Option<SessionUser>,
    pub is_session_loading: bool,
}

pub struct AuthProvider {
    store: Arc<dyn SessionStore>,
    /// Raw session including the access token; the snapshot only carries the
    /// user projection.
    session: RwLock<Option<Session>>,
    state_tx: watch::Sender<AuthSnapshot>,
    /// One-shot user-facing notice, consumed by the next entry-page render.
    notice: Mutex<Option<String>>,
}

impl AuthProvider {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (state_tx, _) = watch::channel(AuthSnapshot { user: None, is_session_loading: true });
        Self { store, session: RwLock::new(None), state_tx, notice: Mutex::new(None) }
    }

    /// Resolve the current session once at startup. Failures are logged and
    /// treated as "no session"; the loading flag clears either way.
    pub async fn init(&self) {
        let session = match self.store.restore_session().await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "error getting session");
                None
            }
        };
        self.apply_auth_change(session).await;
    }

    /// Current state. Cheap; reads the watch channel without subscribing.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Register for auth state changes. Dropping the receiver deregisters.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state_tx.subscribe()
    }

    /// Access token of the current session, used to authenticate table calls.
    pub async fn access_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.access_token.clone())
    }

    /// Build the OAuth authorize URL for the fixed Google provider. The user
    /// is not resolved here; the redirect/callback leg applies the change.
    #[must_use]
    pub fn sign_in(&self, state: &str) -> String {
        self.store.authorize_url(state)
    }

    /// Complete the OAuth callback: exchange the code and apply the session.
    ///
    /// # Errors
    ///
    /// Returns the store error when the code exchange fails; the auth state
    /// is left unchanged in that case.
    pub async fn complete_sign_in(&self, code: &str) -> Result<(), SessionError> {
        let session = self.store.exchange_code(code).await?;
        self.apply_auth_change(Some(session)).await;
        Ok(())
    }

    /// Request session termination from the store. On failure the state is
    /// left unchanged; there is no retry.
    pub async fn sign_out(&self) {
        self.terminate_session().await;
    }

    /// Apply a session-change notification: update state, publish to
    /// subscribers, then re-run the domain policy.
    pub async fn apply_auth_change(&self, session: Option<Session>) {
        self.set_state(session).await;
        self.enforce_domain_policy().await;
    }

    /// Take the pending user-facing notice, clearing it.
    pub fn take_notice(&self) -> Option<String> {
        self.lock_notice().take()
    }

    fn set_notice(&self, message: &str) {
        *self.lock_notice() = Some(message.to_owned());
    }

    fn lock_notice(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.notice.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Publish a new state without running the policy. Loading clears on the
    /// first publish and never comes back.
    async fn set_state(&self, session: Option<Session>) {
        {
            let mut current = self.session.write().await;
            *current = session.clone();
        }
        let snapshot = AuthSnapshot { user: session.map(|s| s.user), is_session_loading: false };
        self.state_tx.send_replace(snapshot);
    }

    /// Sign out at the store and clear local state on success. Split from
    /// `apply_auth_change` so the policy path cannot recurse into itself.
    async fn terminate_session(&self) {
        let token = self.access_token().await;
        let Some(token) = token else {
            // No remote session to terminate.
            self.set_state(None).await;
            return;
        };
        match self.store.sign_out(&token).await {
            Ok(()) => self.set_state(None).await,
            Err(e) => error!(error = %e, "error signing out"),
        }
    }

    /// Check the signed-in email domain against the allowlist, forcing a
    /// sign-out on violation. Runs after every state change, so it also fires
    /// immediately after sign-in completes.
    async fn enforce_domain_policy(&self) {
        let snapshot = self.snapshot();
        if snapshot.is_session_loading {
            return;
        }
        let Some(email) = snapshot.user.as_ref().and_then(|u| u.email.as_deref()) else {
            return;
        };
        // An address with no domain part can never be on the allowlist.
        if email_domain(email).is_some_and(|d| ALLOWED_EMAIL_DOMAINS.contains(&d)) {
            return;
        }

        warn!(%email, "email domain not allowed, signing out");
        self.set_notice(DOMAIN_POLICY_NOTICE);
        self.terminate_session().await;
    }
}

/// Substring after the first `@`, or `None` when there is no `@`.
pub(crate) fn email_domain(email: &str) -> Option<&str> {
    email.split('@').nth(1)
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
