//! Session store client — the boundary to the hosted auth service.
//!
//! ARCHITECTURE
//! ============
//! Sign-in is a browser redirect to the hosted provider's authorize endpoint;
//! the callback leg exchanges the returned code for a session. This crate
//! never mints or validates credentials itself — the auth service owns the
//! session, and everything here is a thin HTTP wrapper behind the
//! [`SessionStore`] trait so the provider can be tested against a mock.

use std::fmt::Write;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BackendConfig;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token for the OAuth
/// CSRF `state` parameter.
#[must_use]
pub fn generate_state_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Identity embedded in a session by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    /// Email may be absent for providers that do not disclose it.
    pub email: Option<String>,
}

/// An authenticated session issued by the auth service. The token is opaque
/// to this crate and is only echoed back on sign-out and table calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: SessionUser,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("auth service request failed: {0}")]
    Transport(String),
    #[error("auth service error: {status}: {body}")]
    Service { status: u16, body: String },
}

/// External auth service boundary: session restore, OAuth redirect, code
/// exchange, sign-out.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Resolve the current session, if any.
    async fn restore_session(&self) -> Result<Option<Session>, SessionError>;

    /// Authorize URL for the fixed OAuth provider, carrying the CSRF state.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an OAuth callback code for a session.
    async fn exchange_code(&self, code: &str) -> Result<Session, SessionError>;

    /// Terminate the session held by `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError>;
}

// =============================================================================
// HOSTED CLIENT
// =============================================================================

/// HTTP client for the hosted auth service's REST API.
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    redirect_uri: String,
}

impl GoTrueClient {
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: SessionUser,
}

#[async_trait::async_trait]
impl SessionStore for GoTrueClient {
    /// Nothing is persisted locally, so a fresh process has no session to
    /// restore and starts signed out.
    async fn restore_session(&self) -> Result<Option<Session>, SessionError> {
        Ok(None)
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/auth/v1/authorize?provider=google&redirect_to={}&state={}",
            self.base_url, self.redirect_uri, state
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<Session, SessionError> {
        let resp = self
            .http
            .post(format!("{}/auth/v1/token?grant_type=authorization_code", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "code": code,
                "redirect_uri": self.redirect_uri,
            }))
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::Service { status, body });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        Ok(Session { access_token: token.access_token, user: token.user })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SessionError> {
        let resp = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::Service { status, body });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
