//! Networking modules for the auth endpoints and the `/api` channel.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves raw requests, `auth_api` talks to the login/profile/
//! register endpoints, `authenticator` attaches the session credential and
//! reacts to rejections, and `api` is the typed client feature code uses.

pub mod api;
pub mod auth_api;
pub mod authenticator;
pub mod case;
pub mod error;
pub mod transport;
pub mod types;
