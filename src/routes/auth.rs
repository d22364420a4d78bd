//! Auth routes — Google OAuth redirect flow, logout, and the page guard.

use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use tracing::error;

use crate::routes::pages;
use crate::services::session::{SessionUser, generate_state_token};
use crate::state::AppState;

const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("OAUTH_REDIRECT_URI")
        .map(|uri| uri.starts_with("https://"))
        .unwrap_or(false)
}

// =============================================================================
// PAGE GUARD
// =============================================================================

/// Viewer guard for `/sektor` pages. Renders a placeholder while the session
/// loads; once loaded, redirects to the entry page when nobody is signed in.
/// Use as a handler parameter to require authentication.
pub struct SektorUser {
    pub user: SessionUser,
}

impl<S> axum::extract::FromRequestParts<S> for SektorUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(_parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let snapshot = app_state.auth.snapshot();

        if snapshot.is_session_loading {
            return Err(pages::session_loading_page().into_response());
        }

        match snapshot.user {
            Some(user) => Ok(Self { user }),
            None => Err(Redirect::temporary("/").into_response()),
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth/login` — set the CSRF state cookie and redirect to the
/// provider's authorization page. The user is resolved later, on callback.
pub async fn login_redirect(State(state): State<AppState>) -> Response {
    let oauth_state = generate_state_token();
    let secure = cookie_secure();
    let cookie = Cookie::build((OAUTH_STATE_COOKIE_NAME, oauth_state.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::minutes(10));

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(&state.auth.sign_in(&oauth_state))).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// `GET /auth/callback` — verify the CSRF state, exchange the code, and land
/// back on the entry page. Exchange failures are logged; the viewer simply
/// arrives signed out.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let secure = cookie_secure();

    let expected_state = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(Cookie::value)
        .unwrap_or_default();
    let callback_state = params.state.as_deref().unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }

    if let Err(e) = state.auth.complete_sign_in(&params.code).await {
        error!(error = %e, "error signing in");
    }

    let clear_state_cookie = Cookie::build((OAUTH_STATE_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO);

    let jar = jar.add(clear_state_cookie);
    (jar, Redirect::temporary("/")).into_response()
}

/// `POST /auth/logout` — terminate the session and land on the entry page.
pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.auth.sign_out().await;
    Redirect::to("/")
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
