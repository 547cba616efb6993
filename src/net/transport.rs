//! HTTP transport seam.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, raced against a
//! `gloo-timers` timeout. Tests substitute their own `Transport`.
//!
//! DESIGN
//! ======
//! Requests and responses are plain data so the authenticator can rewrite
//! headers and classify statuses without touching browser types. The trait
//! futures are `?Send` because browser fetch futures are single-threaded.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use serde::de::DeserializeOwned;

use super::error::ApiError;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
}

/// Outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn with_form(mut self, pairs: &[(&str, &str)]) -> Self {
        self.body = RequestBody::Form(pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect());
        self
    }

    /// Set a header, replacing any existing value (names compare case-insensitively).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION, format!("Bearer {token}"))
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as received, before status classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success status into an `ApiError`.
    ///
    /// # Errors
    ///
    /// Returns the classified error for any non-2xx status.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    /// Parse the body as JSON. Empty bodies decode as `null`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Malformed` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let raw = if self.body.trim().is_empty() { "null" } else { self.body.as_str() };
        serde_json::from_str(raw).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

/// Something that can carry an `HttpRequest` to the server.
#[async_trait::async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Browser `fetch` transport with a uniform timeout.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    timeout: std::time::Duration,
}

impl FetchTransport {
    #[must_use]
    pub fn new(timeout: std::time::Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            use futures::future::{Either, select};

            let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
            let fetch = Box::pin(fetch(request));
            let timer = Box::pin(gloo_timers::future::TimeoutFuture::new(millis));
            match select(fetch, timer).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(ApiError::Timeout(self.timeout)),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (request, self.timeout);
            Err(ApiError::Transport("not available on server".to_owned()))
        }
    }
}

#[cfg(feature = "hydrate")]
async fn fetch(request: HttpRequest) -> Result<HttpResponse, ApiError> {
    use gloo_net::http::{Method as FetchMethod, RequestBuilder};

    let method = match request.method {
        Method::Get => FetchMethod::GET,
        Method::Post => FetchMethod::POST,
        Method::Put => FetchMethod::PUT,
        Method::Patch => FetchMethod::PATCH,
        Method::Delete => FetchMethod::DELETE,
    };
    let mut builder = RequestBuilder::new(&request.url).method(method);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    let built = match request.body {
        RequestBody::Empty => builder.build(),
        RequestBody::Json(value) => builder.json(&value),
        RequestBody::Form(pairs) => {
            let encoded = serde_urlencoded::to_string(&pairs).map_err(|e| ApiError::Transport(e.to_string()))?;
            builder
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(encoded)
        }
    }
    .map_err(|e| ApiError::Transport(e.to_string()))?;

    let resp = built
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = resp.status();
    let body = resp.text().await.map_err(|e| ApiError::Malformed(e.to_string()))?;
    Ok(HttpResponse { status, body })
}
