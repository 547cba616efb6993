//! Credential attachment and rejection handling for the `/api` channel.
//!
//! ERROR HANDLING
//! ==============
//! A 401 logs the session out as a side effect and is still returned to the
//! caller. Other failures pass through untouched. A stale rejection racing a
//! fresh login is last-writer-wins; both sides are total overwrites.

#[cfg(test)]
#[path = "authenticator_test.rs"]
mod authenticator_test;

use super::case::camelize_keys;
use super::error::ApiError;
use super::transport::{HttpRequest, HttpResponse};
use crate::state::session::Session;

/// Request/response hooks bound to one session.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    session: Session,
}

impl RequestAuthenticator {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Outgoing hook: attach the bearer credential when one is held.
    #[must_use]
    pub fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.session.credential() {
            Some(token) => request.with_bearer(&token),
            None => request,
        }
    }

    /// Incoming hook: classify the response and rewrite payload keys.
    ///
    /// # Errors
    ///
    /// Returns the transport or status failure unchanged; a 401 additionally
    /// forces logout before being returned.
    pub fn inspect(&self, result: Result<HttpResponse, ApiError>) -> Result<serde_json::Value, ApiError> {
        match result.and_then(HttpResponse::error_for_status) {
            Ok(response) => Ok(camelize_keys(response.json()?)),
            Err(err) => {
                if err.is_credential_rejected() {
                    self.session.force_logout();
                }
                Err(err)
            }
        }
    }
}
