//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds handles to the auth provider and the employee directory; both are
//! Arc-wrapped so Clone stays cheap, and both sit behind trait-object stores
//! so tests can swap in mocks.

use std::sync::Arc;

use crate::services::employees::EmployeeDirectory;
use crate::services::provider::AuthProvider;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthProvider>,
    pub employees: Arc<EmployeeDirectory>,
}

impl AppState {
    #[must_use]
    pub fn new(auth: Arc<AuthProvider>, employees: Arc<EmployeeDirectory>) -> Self {
        Self { auth, employees }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::services::employees::{Employee, EmployeeDraft, EmployeeError, EmployeeStore};
    use crate::services::session::{Session, SessionError, SessionStore, SessionUser};

    /// Session with a fixed token and the given email.
    #[must_use]
    pub fn session_for(email: &str) -> Session {
        Session {
            access_token: "token-123".into(),
            user: SessionUser { id: Uuid::new_v4(), email: Some(email.into()) },
        }
    }

    /// Mock auth service with call counters and stageable results.
    pub struct MockSessionStore {
        pub restored: Mutex<Option<Result<Option<Session>, SessionError>>>,
        pub exchange: Mutex<Option<Session>>,
        pub sign_out_calls: AtomicUsize,
        pub sign_out_fails: AtomicBool,
    }

    impl MockSessionStore {
        /// Restores no session (fresh process).
        #[must_use]
        pub fn empty() -> Arc<Self> {
            Arc::new(Self {
                restored: Mutex::new(Some(Ok(None))),
                exchange: Mutex::new(None),
                sign_out_calls: AtomicUsize::new(0),
                sign_out_fails: AtomicBool::new(false),
            })
        }

        /// Restores the given session on init.
        #[must_use]
        pub fn with_session(session: Session) -> Arc<Self> {
            let store = Self::empty();
            *store.restored.lock().unwrap() = Some(Ok(Some(session)));
            store
        }

        /// Fails the initial session retrieval.
        #[must_use]
        pub fn failing_restore() -> Arc<Self> {
            let store = Self::empty();
            *store.restored.lock().unwrap() =
                Some(Err(SessionError::Transport("connection refused".into())));
            store
        }

        /// Stage the session returned by the next code exchange.
        pub fn stage_exchange(&self, session: Session) {
            *self.exchange.lock().unwrap() = Some(session);
        }

        #[must_use]
        pub fn sign_out_count(&self) -> usize {
            self.sign_out_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SessionStore for MockSessionStore {
        async fn restore_session(&self) -> Result<Option<Session>, SessionError> {
            self.restored.lock().unwrap().take().unwrap_or(Ok(None))
        }

        fn authorize_url(&self, state: &str) -> String {
            format!("https://auth.test/authorize?provider=google&state={state}")
        }

        async fn exchange_code(&self, _code: &str) -> Result<Session, SessionError> {
            self.exchange
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| SessionError::Transport("no session staged".into()))
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), SessionError> {
            self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
            if self.sign_out_fails.load(Ordering::SeqCst) {
                return Err(SessionError::Service { status: 500, body: "boom".into() });
            }
            Ok(())
        }
    }

    /// Mock table service backed by an in-memory row list, with call counters
    /// and failure switches.
    pub struct MockEmployeeStore {
        pub rows: Mutex<Vec<Employee>>,
        pub list_calls: AtomicUsize,
        pub insert_calls: AtomicUsize,
        pub update_calls: AtomicUsize,
        pub delete_calls: AtomicUsize,
        pub fail_list: AtomicBool,
        pub fail_mutations: AtomicBool,
    }

    impl MockEmployeeStore {
        #[must_use]
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
                list_calls: AtomicUsize::new(0),
                insert_calls: AtomicUsize::new(0),
                update_calls: AtomicUsize::new(0),
                delete_calls: AtomicUsize::new(0),
                fail_list: AtomicBool::new(false),
                fail_mutations: AtomicBool::new(false),
            })
        }

        #[must_use]
        pub fn with_rows(rows: Vec<Employee>) -> Arc<Self> {
            let store = Self::new();
            *store.rows.lock().unwrap() = rows;
            store
        }

        fn mutation_gate(&self) -> Result<(), EmployeeError> {
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(EmployeeError::Service { status: 500, body: "boom".into() });
            }
            Ok(())
        }

        pub fn counts(&self) -> (usize, usize, usize, usize) {
            (
                self.list_calls.load(Ordering::SeqCst),
                self.insert_calls.load(Ordering::SeqCst),
                self.update_calls.load(Ordering::SeqCst),
                self.delete_calls.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait::async_trait]
    impl EmployeeStore for MockEmployeeStore {
        async fn list(&self, _access_token: &str) -> Result<Vec<Employee>, EmployeeError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(EmployeeError::Transport("connection refused".into()));
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, _access_token: &str, draft: &EmployeeDraft) -> Result<(), EmployeeError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            self.mutation_gate()?;
            self.rows.lock().unwrap().insert(
                0,
                Employee {
                    id: Uuid::new_v4(),
                    name: draft.name.clone(),
                    position: draft.position.clone(),
                    department: draft.department.clone(),
                    created_at: None,
                },
            );
            Ok(())
        }

        async fn update(&self, _access_token: &str, id: Uuid, draft: &EmployeeDraft) -> Result<(), EmployeeError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            self.mutation_gate()?;
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|e| e.id == id) {
                row.name = draft.name.clone();
                row.position = draft.position.clone();
                row.department = draft.department.clone();
            }
            Ok(())
        }

        async fn delete(&self, _access_token: &str, id: Uuid) -> Result<(), EmployeeError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.mutation_gate()?;
            self.rows.lock().unwrap().retain(|e| e.id != id);
            Ok(())
        }
    }

    #[must_use]
    pub fn dummy_employee(name: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            name: name.into(),
            position: "Clerk".into(),
            department: "Records".into(),
            created_at: None,
        }
    }

    /// `AppState` with mock stores and no session (loading already resolved).
    pub async fn test_app_state() -> AppState {
        let auth = Arc::new(AuthProvider::new(MockSessionStore::empty()));
        auth.init().await;
        let employees = Arc::new(EmployeeDirectory::new(MockEmployeeStore::new()));
        AppState::new(auth, employees)
    }

    /// `AppState` with a signed-in session for `email`, handing back the
    /// mocks for call-count assertions.
    pub async fn signed_in_app_state(email: &str) -> (AppState, Arc<MockSessionStore>, Arc<MockEmployeeStore>) {
        let session_store = MockSessionStore::with_session(session_for(email));
        let auth = Arc::new(AuthProvider::new(session_store.clone()));
        auth.init().await;
        let employee_store = MockEmployeeStore::new();
        let employees = Arc::new(EmployeeDirectory::new(employee_store.clone()));
        (AppState::new(auth, employees), session_store, employee_store)
    }
}
