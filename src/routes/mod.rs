//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the public entry page, the guarded `/sektor` pages, the OAuth
//! redirect/callback legs, and the employee CRUD form posts under a single
//! Axum router.

pub mod auth;
pub mod employees;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/sektor", get(pages::dashboard))
        .route("/sektor/employees", get(pages::employees_page).post(employees::submit))
        .route("/sektor/employees/{id}/delete", post(employees::delete))
        .route("/auth/login", get(auth::login_redirect))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
