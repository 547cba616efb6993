//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Pages read the session through context and never touch the credential
//! store or transport directly.

pub mod admin;
pub mod forbidden;
pub mod home;
pub mod jira;
pub mod login;
pub mod not_found;
