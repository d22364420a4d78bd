//! Environment-driven configuration for the hosted backend.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Connection details for the hosted auth + table service.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted service, without a trailing slash.
    pub url: String,
    /// Public (anonymous) API key sent with every request.
    pub anon_key: String,
    /// Callback URI registered with the OAuth provider.
    pub redirect_uri: String,
}

impl BackendConfig {
    /// Load from `BACKEND_URL`, `BACKEND_ANON_KEY`, `OAUTH_REDIRECT_URI`.
    /// Returns `None` if any are missing.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("BACKEND_URL").ok()?;
        let anon_key = std::env::var("BACKEND_ANON_KEY").ok()?;
        let redirect_uri = std::env::var("OAUTH_REDIRECT_URI").ok()?;
        Some(Self { url: url.trim_end_matches('/').to_owned(), anon_key, redirect_uri })
    }
}
