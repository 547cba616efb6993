//! Shared fakes for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::net::auth_api::AuthBackend;
use crate::net::error::ApiError;
use crate::net::transport::{HttpRequest, HttpResponse, Transport};
use crate::net::types::{ApiErrorBody, RegisterRequest, UserProfile};
use crate::state::credential::MemoryCredentialStore;
use crate::state::session::Session;

pub fn profile(id: &str, email: &str, is_admin: bool) -> UserProfile {
    UserProfile { id: id.to_owned(), email: email.to_owned(), full_name: None, is_admin }
}

pub fn rejected(detail: &str) -> ApiError {
    ApiError::CredentialRejected {
        body: Some(ApiErrorBody { detail: Some(detail.to_owned()), message: None }),
    }
}

// =========================================================================
// MockBackend
// =========================================================================

/// Scriptable `AuthBackend` that counts calls.
///
/// Unknown tokens are rejected with 401. `yields` makes every call suspend
/// that many times before answering, so concurrent callers can interleave.
#[derive(Default)]
pub struct MockBackend {
    pub exchange_result: Mutex<Option<Result<String, ApiError>>>,
    pub profiles: Mutex<HashMap<String, Result<UserProfile, ApiError>>>,
    pub register_result: Mutex<Option<Result<(), ApiError>>>,
    pub registrations: Mutex<Vec<RegisterRequest>>,
    pub exchange_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub yields: usize,
}

impl MockBackend {
    pub fn slow(yields: usize) -> Self {
        Self { yields, ..Self::default() }
    }

    pub fn with_profile(self, token: &str, result: Result<UserProfile, ApiError>) -> Self {
        self.profiles.lock().unwrap().insert(token.to_owned(), result);
        self
    }

    pub fn with_exchange(self, result: Result<String, ApiError>) -> Self {
        *self.exchange_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_register(self, result: Result<(), ApiError>) -> Self {
        *self.register_result.lock().unwrap() = Some(result);
        self
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait::async_trait(?Send)]
impl AuthBackend for MockBackend {
    async fn exchange(&self, _identifier: &str, _secret: &str) -> Result<String, ApiError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.exchange_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ApiError::Transport("no exchange scripted".to_owned())))
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.profiles
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or_else(|| Err(rejected("Could not validate credentials")))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.registrations.lock().unwrap().push(request.clone());
        self.pause().await;
        self.register_result.lock().unwrap().clone().unwrap_or(Ok(()))
    }
}

// =========================================================================
// MockTransport
// =========================================================================

/// `Transport` that records requests and replays scripted responses.
///
/// With nothing scripted it answers `200 null`.
#[derive(Default)]
pub struct MockTransport {
    pub responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
    }

    pub fn fail(&self, err: ApiError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse { status: 200, body: "null".to_owned() }))
    }
}

// =========================================================================
// Session fixtures
// =========================================================================

pub struct Fixture {
    pub session: Session,
    pub store: Arc<MemoryCredentialStore>,
    pub backend: Arc<MockBackend>,
}

/// Session over a memory store seeded with `persisted`.
pub fn fixture(persisted: Option<&str>, backend: MockBackend) -> Fixture {
    let store = Arc::new(persisted.map_or_else(MemoryCredentialStore::default, MemoryCredentialStore::with_credential));
    let backend = Arc::new(backend);
    let session = Session::new(store.clone(), backend.clone());
    Fixture { session, store, backend }
}
