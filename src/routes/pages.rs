//! Page views — server-rendered HTML for the entry page, the dashboard, and
//! the employees directory.
//!
//! DESIGN
//! ======
//! Pages are plain HTML strings assembled per request from provider and
//! directory state; nothing is cached between requests. Outcome notices
//! travel across redirects as fixed query codes and are mapped back to
//! messages at render time, so no free text rides in the URL.

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

use crate::routes::auth::SektorUser;
use crate::services::employees::Employee;
use crate::state::AppState;

// =============================================================================
// NOTICES
// =============================================================================

/// Outcome notice carried across a redirect as a fixed query code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
    CreateFailed,
    UpdateFailed,
    DeleteFailed,
    Validation,
    ConfirmRequired,
}

impl Notice {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::CreateFailed => "create_failed",
            Self::UpdateFailed => "update_failed",
            Self::DeleteFailed => "delete_failed",
            Self::Validation => "validation",
            Self::ConfirmRequired => "confirm_required",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            "create_failed" => Some(Self::CreateFailed),
            "update_failed" => Some(Self::UpdateFailed),
            "delete_failed" => Some(Self::DeleteFailed),
            "validation" => Some(Self::Validation),
            "confirm_required" => Some(Self::ConfirmRequired),
            _ => None,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "Employee added successfully!",
            Self::Updated => "Employee updated successfully!",
            Self::Deleted => "Employee deleted successfully!",
            Self::CreateFailed => "Failed to add new employee.",
            Self::UpdateFailed => "Failed to update employee.",
            Self::DeleteFailed => "Failed to delete employee.",
            Self::Validation => "Please fill out all fields.",
            Self::ConfirmRequired => "Deletion was not confirmed.",
        }
    }

    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::CreateFailed | Self::UpdateFailed | Self::DeleteFailed | Self::Validation | Self::ConfirmRequired
        )
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

const STYLE: &str = "body{font-family:sans-serif;margin:0;color:#1f2937}\
main{padding:1.5rem}\
.shell{display:flex;min-height:100vh}\
.sidebar{width:16rem;background:#155e75;color:#fff;padding:1rem}\
.sidebar a{display:block;color:#fff;text-decoration:none;padding:.5rem .75rem;border-radius:.25rem}\
.sidebar a:hover{background:#0e7490}\
.card{background:#fff;border:1px solid #e5e7eb;border-radius:.5rem;box-shadow:0 1px 2px rgba(0,0,0,.1);padding:1rem;margin-bottom:1.5rem}\
.center{display:flex;align-items:center;justify-content:center;height:100vh}\
.notice{background:#ecfeff;border:1px solid #06b6d4;padding:.5rem .75rem;border-radius:.25rem}\
.notice.failure{background:#fef2f2;border-color:#ef4444}\
table{width:100%;border-collapse:collapse}\
th{background:#0e7490;color:#fff;text-align:left;padding:.75rem}\
td{padding:.75rem;border-bottom:1px solid #e5e7eb}\
input{border:1px solid #d1d5db;padding:.5rem;border-radius:.25rem;margin-right:.5rem}\
button,.button{background:#0891b2;color:#fff;border:none;padding:.5rem 1rem;border-radius:.25rem;cursor:pointer;text-decoration:none;display:inline-block}";

/// Minimal HTML escaping for user-controlled text and attribute values.
pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} — Project Genesis</title><style>{STYLE}</style></head>\
         <body>{body}</body></html>"
    ))
}

fn sektor_layout(title: &str, content: &str) -> Html<String> {
    let body = format!(
        "<div class=\"shell\">\
         <aside class=\"sidebar\"><h2>Sektor Pembelajaran</h2><nav>\
         <a href=\"/\">Home</a>\
         <a href=\"/sektor\">Dashboard</a>\
         <a href=\"/sektor/employees\">Employees</a>\
         </nav></aside>\
         <main>{content}</main></div>"
    );
    layout(title, &body)
}

/// Placeholder rendered while the initial session retrieval is in flight.
pub(crate) fn session_loading_page() -> Html<String> {
    layout("Checking session", "<div class=\"center\"><p>Checking session...</p></div>")
}

fn notice_banner(notice: Notice) -> String {
    let class = if notice.is_failure() { "notice failure" } else { "notice" };
    format!("<p class=\"{class}\">{}</p>", notice.message())
}

// =============================================================================
// PAGES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub notice: Option<String>,
}

/// `GET /` — public entry page with login/logout.
pub async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Html<String> {
    let snapshot = state.auth.snapshot();
    if snapshot.is_session_loading {
        return session_loading_page();
    }

    let mut banners = String::new();
    if let Some(notice) = state.auth.take_notice() {
        banners.push_str(&format!("<p class=\"notice failure\">{}</p>", escape_html(&notice)));
    }
    if let Some(notice) = query.notice.as_deref().and_then(Notice::from_code) {
        banners.push_str(&notice_banner(notice));
    }

    let actions = match snapshot.user.as_ref() {
        Some(user) => format!(
            "<p>Logged in as {email}</p>\
             <p><a class=\"button\" href=\"/sektor\">Go to Sektor Dashboard</a></p>\
             <form method=\"post\" action=\"/auth/logout\"><button type=\"submit\">Logout</button></form>",
            email = escape_html(user.email.as_deref().unwrap_or("unknown")),
        ),
        None => "<p><a class=\"button\" href=\"/auth/login\">Login with Google</a></p>".to_owned(),
    };

    layout(
        "Welcome",
        &format!("<main><h1>Welcome to Project Genesis</h1>{banners}{actions}</main>"),
    )
}

/// `GET /sektor` — auth-required dashboard.
pub async fn dashboard(viewer: SektorUser) -> Html<String> {
    let content = format!(
        "<h1>Sektor Pembelajaran Dashboard</h1>\
         <p>Welcome, {email}!</p>\
         <div class=\"card\"><h2>Overview</h2>\
         <p>Key stats and announcements for the sector live here.</p></div>\
         <div class=\"card\"><h2>Quick Links</h2><ul>\
         <li>Employees Database</li><li>Attendance System</li><li>Performance Reviews</li>\
         </ul></div>",
        email = escape_html(viewer.user.email.as_deref().unwrap_or("unknown")),
    );
    sektor_layout("Dashboard", &content)
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeesQuery {
    /// Editing reference: prefills the form from the cached row.
    pub edit: Option<Uuid>,
    pub notice: Option<String>,
}

/// `GET /sektor/employees` — auth-required CRUD UI.
pub async fn employees_page(
    State(state): State<AppState>,
    viewer: SektorUser,
    Query(query): Query<EmployeesQuery>,
) -> Html<String> {
    if let Some(token) = state.auth.access_token().await {
        // Fetch failures are logged inside refresh; the stale cache renders.
        let _ = state.employees.refresh(&token).await;
    }

    let records = state.employees.records().await;
    let editing = match query.edit {
        Some(id) => state.employees.find(id).await,
        None => None,
    };
    let banner = query
        .notice
        .as_deref()
        .and_then(Notice::from_code)
        .map(notice_banner)
        .unwrap_or_default();

    let content = format!(
        "<h1>Employees Directory</h1>\
         <p>Manage your employees here. Logged in as {email}.</p>\
         {banner}{form}{table}",
        email = escape_html(viewer.user.email.as_deref().unwrap_or("unknown")),
        form = employee_form(editing.as_ref()),
        table = employee_table(&records),
    );
    sektor_layout("Employees", &content)
}

// =============================================================================
// EMPLOYEE FRAGMENTS
// =============================================================================

fn employee_form(editing: Option<&Employee>) -> String {
    let heading = if editing.is_some() { "Edit Employee" } else { "Add New Employee" };
    let submit = if editing.is_some() { "Update" } else { "Add" };
    let id_field = editing
        .map(|e| format!("<input type=\"hidden\" name=\"id\" value=\"{}\">", e.id))
        .unwrap_or_default();
    let cancel = if editing.is_some() {
        "<a href=\"/sektor/employees\">Cancel</a>"
    } else {
        ""
    };
    let (name, position, department) = editing
        .map(|e| (escape_html(&e.name), escape_html(&e.position), escape_html(&e.department)))
        .unwrap_or_default();

    format!(
        "<div class=\"card\"><h2>{heading}</h2>\
         <form method=\"post\" action=\"/sektor/employees\">{id_field}\
         <input type=\"text\" name=\"name\" placeholder=\"Name\" value=\"{name}\">\
         <input type=\"text\" name=\"position\" placeholder=\"Position\" value=\"{position}\">\
         <input type=\"text\" name=\"department\" placeholder=\"Department\" value=\"{department}\">\
         <button type=\"submit\">{submit}</button> {cancel}</form></div>"
    )
}

fn employee_table(records: &[Employee]) -> String {
    if records.is_empty() {
        return "<div class=\"card\"><h2>Employee Records</h2><p>No employees found.</p></div>".to_owned();
    }

    let mut rows = String::new();
    for employee in records {
        rows.push_str(&format!(
            "<tr><td>{name}</td><td>{position}</td><td>{department}</td><td>{created}</td>\
             <td><a class=\"button\" href=\"/sektor/employees?edit={id}\">Edit</a> \
             <form method=\"post\" action=\"/sektor/employees/{id}/delete\" style=\"display:inline\" \
             onsubmit=\"return confirm('Are you sure you want to delete this employee?')\">\
             <input type=\"hidden\" name=\"confirmed\" value=\"true\">\
             <button type=\"submit\">Delete</button></form></td></tr>",
            name = escape_html(&employee.name),
            position = escape_html(&employee.position),
            department = escape_html(&employee.department),
            created = created_at_label(employee.created_at),
            id = employee.id,
        ));
    }

    format!(
        "<div class=\"card\"><h2>Employee Records</h2><table><thead><tr>\
         <th>Name</th><th>Position</th><th>Department</th><th>Created At</th><th>Actions</th>\
         </tr></thead><tbody>{rows}</tbody></table></div>"
    )
}

fn created_at_label(created_at: Option<OffsetDateTime>) -> String {
    let Some(created) = created_at else {
        return "N/A".to_owned();
    };
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    created.format(format).unwrap_or_else(|_| "N/A".to_owned())
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
