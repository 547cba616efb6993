//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` is the single owner of the credential and profile. `credential`
//! holds the durable mirror, and `auth` is the snapshot the UI renders from.

pub mod auth;
pub mod credential;
pub mod session;
