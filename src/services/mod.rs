//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session state and the remote-service clients so
//! route handlers can stay focused on request plumbing and rendering.

pub mod employees;
pub mod provider;
pub mod session;
