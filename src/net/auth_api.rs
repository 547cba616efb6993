//! Auth collaborators: credential exchange, profile lookup, registration.
//!
//! SYSTEM CONTEXT
//! ==============
//! These endpoints live beside the `/api` channel, not on it. The session
//! owns their error handling, so a 401 here never triggers forced logout.

#[cfg(test)]
#[path = "auth_api_test.rs"]
mod auth_api_test;

use std::sync::Arc;

use super::error::ApiError;
use super::transport::{HttpRequest, Method, Transport};
use super::types::{RegisterRequest, TokenResponse, UserProfile};
use crate::config::ClientConfig;

fn login_endpoint(config: &ClientConfig) -> String {
    config.auth_url("login")
}

fn profile_endpoint(config: &ClientConfig) -> String {
    config.auth_url("me")
}

fn register_endpoint(config: &ClientConfig) -> String {
    config.auth_url("register")
}

/// Backend operations the session depends on.
#[async_trait::async_trait(?Send)]
pub trait AuthBackend: Send + Sync {
    /// Exchange an identifier and secret for a bearer token.
    async fn exchange(&self, identifier: &str, secret: &str) -> Result<String, ApiError>;

    /// Resolve the identity behind `token`.
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError>;

    /// Submit a registration request. Success does not sign the user in.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;
}

/// `AuthBackend` over an HTTP `Transport`.
#[derive(Clone)]
pub struct HttpAuthBackend {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl HttpAuthBackend {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }
}

#[async_trait::async_trait(?Send)]
impl AuthBackend for HttpAuthBackend {
    async fn exchange(&self, identifier: &str, secret: &str) -> Result<String, ApiError> {
        let request = HttpRequest::new(Method::Post, login_endpoint(&self.config))
            .with_form(&[("username", identifier), ("password", secret)]);
        let token: TokenResponse = self.transport.send(request).await?.error_for_status()?.json()?;
        if token.access_token.is_empty() {
            return Err(ApiError::Malformed("empty access_token".to_owned()));
        }
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        let request = HttpRequest::get(profile_endpoint(&self.config)).with_bearer(token);
        self.transport.send(request).await?.error_for_status()?.json()
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let request = HttpRequest::new(Method::Post, register_endpoint(&self.config)).with_json(body);
        self.transport.send(request).await?.error_for_status()?;
        Ok(())
    }
}
