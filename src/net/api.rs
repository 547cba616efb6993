//! Authenticated REST client for the `/api` channel.
//!
//! SYSTEM CONTEXT
//! ==============
//! Feature services (assets, watch, inspection, pilot) issue every request
//! through `ApiClient`, which routes it through the `RequestAuthenticator`.
//! Payload keys arrive camelCased, so DTOs on this channel use
//! `#[serde(rename_all = "camelCase")]`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::authenticator::RequestAuthenticator;
use super::error::ApiError;
use super::transport::{HttpRequest, Method, Transport};
use crate::config::ClientConfig;
use crate::state::session::Session;

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    authenticator: RequestAuthenticator,
    config: ClientConfig,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: Session, config: ClientConfig) -> Self {
        Self { transport, authenticator: RequestAuthenticator::new(session), config }
    }

    /// Send a fully built request through the authenticator.
    ///
    /// # Errors
    ///
    /// Returns any transport, status or decode failure.
    pub async fn send(&self, request: HttpRequest) -> Result<serde_json::Value, ApiError> {
        let request = self.authenticator.authorize(request);
        let result = self.transport.send(request).await;
        self.authenticator.inspect(result)
    }

    /// `GET {api_base}{path}`.
    ///
    /// # Errors
    ///
    /// Returns any request failure or a decode error for `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.send(HttpRequest::get(self.config.api_url(path))).await?)
    }

    /// `GET {api_base}{path}?{query}`.
    ///
    /// # Errors
    ///
    /// Returns an error if `query` does not encode, the request fails, or the
    /// payload does not decode as `T`.
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let encoded = serde_urlencoded::to_string(query).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let mut url = self.config.api_url(path);
        if !encoded.is_empty() {
            url.push('?');
            url.push_str(&encoded);
        }
        decode(self.send(HttpRequest::get(url)).await?)
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns any request failure or a decode error for `T`.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send_json(Method::Post, path, body).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns any request failure or a decode error for `T`.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send_json(Method::Put, path, body).await
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns any request failure or a decode error for `T`.
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.send_json(Method::Patch, path, body).await
    }

    /// `DELETE {api_base}{path}`; any success body is discarded.
    ///
    /// # Errors
    ///
    /// Returns any request failure.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::Delete, self.config.api_url(path))).await?;
        Ok(())
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let request = HttpRequest::new(method, self.config.api_url(path)).with_json(body);
        decode(self.send(request).await?)
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
}
