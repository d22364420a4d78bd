//! Employee CRUD form handlers.
//!
//! Each mutation is a single pass-through call to the directory followed by a
//! redirect back to the list page; the redirect drops the form draft and any
//! editing reference, and the outcome travels as a notice code.

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Redirect;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::SektorUser;
use crate::routes::pages::Notice;
use crate::services::employees::{EmployeeDraft, EmployeeError};
use crate::state::AppState;

fn employees_redirect(notice: Notice) -> Redirect {
    Redirect::to(&format!("/sektor/employees?notice={}", notice.code()))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeForm {
    /// Editing reference; present when the form was prefilled from a row.
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
}

/// `POST /sektor/employees` — create, or update when an editing id is
/// present. Empty fields abort before any remote call.
pub async fn submit(
    State(state): State<AppState>,
    _viewer: SektorUser,
    Form(form): Form<EmployeeForm>,
) -> Redirect {
    let Some(token) = state.auth.access_token().await else {
        return Redirect::temporary("/");
    };
    let draft = EmployeeDraft { name: form.name, position: form.position, department: form.department };

    let notice = match form.id {
        Some(id) => match state.employees.update(&token, id, &draft).await {
            Ok(()) => Notice::Updated,
            Err(EmployeeError::Validation) => {
                // Keep the editing reference so the form stays in edit mode.
                return Redirect::to(&format!(
                    "/sektor/employees?edit={id}&notice={}",
                    Notice::Validation.code()
                ));
            }
            Err(_) => Notice::UpdateFailed,
        },
        None => match state.employees.create(&token, &draft).await {
            Ok(()) => Notice::Created,
            Err(EmployeeError::Validation) => Notice::Validation,
            Err(_) => Notice::CreateFailed,
        },
    };
    employees_redirect(notice)
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    /// Set by the interactive confirm gate in the rendered form.
    #[serde(default)]
    pub confirmed: bool,
}

/// `POST /sektor/employees/{id}/delete` — delete by identifier. Without the
/// confirmation field no remote call is made.
pub async fn delete(
    State(state): State<AppState>,
    _viewer: SektorUser,
    Path(id): Path<Uuid>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    if !form.confirmed {
        return employees_redirect(Notice::ConfirmRequired);
    }
    let Some(token) = state.auth.access_token().await else {
        return Redirect::temporary("/");
    };

    let notice = match state.employees.delete(&token, id).await {
        Ok(()) => Notice::Deleted,
        Err(_) => Notice::DeleteFailed,
    };
    employees_redirect(notice)
}

#[cfg(test)]
#[path = "employees_test.rs"]
mod tests;
