//! Employee records client — CRUD against the hosted `employees` table.
//!
//! DESIGN
//! ======
//! Mutations never patch the local cache. Every successful mutation is
//! followed by one full `refresh()`, and the cache is only ever the result of
//! the last successful fetch. Last write wins at the remote table; there is
//! no offline queue, conflict resolution, or automatic retry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::error;
use uuid::Uuid;

use crate::config::BackendConfig;

/// One row of the remote `employees` table. `id` and `created_at` are
/// server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub department: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Transient unsaved form state for create/update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    pub position: String,
    pub department: String,
}

impl EmployeeDraft {
    /// All three fields must be non-empty before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`EmployeeError::Validation`] when a field is empty.
    pub fn validate(&self) -> Result<(), EmployeeError> {
        if self.name.is_empty() || self.position.is_empty() || self.department.is_empty() {
            return Err(EmployeeError::Validation);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmployeeError {
    #[error("please fill out all fields")]
    Validation,
    #[error("table service request failed: {0}")]
    Transport(String),
    #[error("table service error: {status}: {body}")]
    Service { status: u16, body: String },
}

/// Remote table boundary for the `employees` table. Each call is a single
/// round trip authenticated with the viewer's access token.
#[async_trait::async_trait]
pub trait EmployeeStore: Send + Sync {
    /// All rows, ordered by creation time descending.
    async fn list(&self, access_token: &str) -> Result<Vec<Employee>, EmployeeError>;
    async fn insert(&self, access_token: &str, draft: &EmployeeDraft) -> Result<(), EmployeeError>;
    async fn update(&self, access_token: &str, id: Uuid, draft: &EmployeeDraft) -> Result<(), EmployeeError>;
    async fn delete(&self, access_token: &str, id: Uuid) -> Result<(), EmployeeError>;
}

// =============================================================================
// HOSTED CLIENT
// =============================================================================

/// HTTP client for the hosted table service's REST API.
pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestClient {
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/employees", self.base_url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, EmployeeError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(EmployeeError::Service { status, body })
    }
}

fn transport(e: reqwest::Error) -> EmployeeError {
    EmployeeError::Transport(e.to_string())
}

#[async_trait::async_trait]
impl EmployeeStore for PostgrestClient {
    async fn list(&self, access_token: &str) -> Result<Vec<Employee>, EmployeeError> {
        let resp = self
            .http
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?.json().await.map_err(transport)
    }

    async fn insert(&self, access_token: &str, draft: &EmployeeDraft) -> Result<(), EmployeeError> {
        let resp = self
            .http
            .post(self.table_url())
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(&[draft])
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn update(&self, access_token: &str, id: Uuid, draft: &EmployeeDraft) -> Result<(), EmployeeError> {
        let resp = self
            .http
            .patch(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(draft)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, access_token: &str, id: Uuid) -> Result<(), EmployeeError> {
        let resp = self
            .http
            .delete(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?;
        Ok(())
    }
}

// =============================================================================
// DIRECTORY
// =============================================================================

/// Owner of the transient local copy of the employees list plus the
/// refetch-after-mutation flow.
pub struct EmployeeDirectory {
    store: Arc<dyn EmployeeStore>,
    cache: RwLock<Vec<Employee>>,
}

impl EmployeeDirectory {
    #[must_use]
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store, cache: RwLock::new(Vec::new()) }
    }

    /// The last successfully fetched rows.
    pub async fn records(&self) -> Vec<Employee> {
        self.cache.read().await.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<Employee> {
        self.cache.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// The single refetch operation: fetch all rows and replace the cache.
    /// On failure the previous cache is kept and the error is logged before
    /// being returned.
    ///
    /// # Errors
    ///
    /// Returns the store error when the fetch fails.
    pub async fn refresh(&self, access_token: &str) -> Result<(), EmployeeError> {
        match self.store.list(access_token).await {
            Ok(rows) => {
                *self.cache.write().await = rows;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "error fetching employees");
                Err(e)
            }
        }
    }

    /// Insert one row from the draft, then refetch.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any network call when a field is
    /// empty, or the store error when the insert fails.
    pub async fn create(&self, access_token: &str, draft: &EmployeeDraft) -> Result<(), EmployeeError> {
        draft.validate()?;
        self.store
            .insert(access_token, draft)
            .await
            .inspect_err(|e| error!(error = %e, "error adding employee"))?;
        // A failed refetch after a successful insert is logged inside
        // refresh(); the stale cache remains visible until the next fetch.
        let _ = self.refresh(access_token).await;
        Ok(())
    }

    /// Overwrite the three fields of the referenced row, then refetch.
    ///
    /// # Errors
    ///
    /// Same contract as [`EmployeeDirectory::create`].
    pub async fn update(&self, access_token: &str, id: Uuid, draft: &EmployeeDraft) -> Result<(), EmployeeError> {
        draft.validate()?;
        self.store
            .update(access_token, id, draft)
            .await
            .inspect_err(|e| error!(error = %e, "error updating employee"))?;
        let _ = self.refresh(access_token).await;
        Ok(())
    }

    /// Delete by identifier, then refetch. Interactive confirmation is the
    /// caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns the store error when the delete fails.
    pub async fn delete(&self, access_token: &str, id: Uuid) -> Result<(), EmployeeError> {
        self.store
            .delete(access_token, id)
            .await
            .inspect_err(|e| error!(error = %e, "error deleting employee"))?;
        let _ = self.refresh(access_token).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "employees_test.rs"]
mod tests;
