//! Session state machine: credential, profile, and the one-time restore.
//!
//! ARCHITECTURE
//! ============
//! `Session` is a cheap handle over shared state. The router guard and the
//! request authenticator each hold a clone; nothing reaches the fields except
//! through the operations below.
//!
//! CONCURRENCY
//! ===========
//! Mutators run on one logical thread but suspend at network calls, so their
//! effects interleave in completion order. The state lock is never held
//! across an `.await`. The restore is a single-flight `OnceCell`: the first
//! caller runs it, concurrent callers wait on that same run, later callers
//! return at once.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use super::auth::AuthState;
use super::credential::CredentialStore;
use crate::net::auth_api::AuthBackend;
use crate::net::error::ApiError;
use crate::net::types::{RegisterRequest, UserProfile};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Register failed";

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Debug, Default)]
struct SessionData {
    credential: Option<String>,
    profile: Option<UserProfile>,
    loading: bool,
    last_error: Option<String>,
}

struct SessionInner {
    data: Mutex<SessionData>,
    store: Arc<dyn CredentialStore>,
    backend: Arc<dyn AuthBackend>,
    restore: OnceCell<()>,
    listeners: Mutex<Vec<Listener>>,
}

/// Handle to the client's authentication state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("state", &self.snapshot()).finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session seeded from `store`. Not yet bootstrapped.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let credential = store.read();
        log::debug!("session created (persisted credential: {})", credential.is_some());
        Self {
            inner: Arc::new(SessionInner {
                data: Mutex::new(SessionData { credential, ..SessionData::default() }),
                store,
                backend,
                restore: OnceCell::new(),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    // =========================================================================
    // READERS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        let data = self.lock();
        AuthState {
            authenticated: data.credential.is_some(),
            user: data.profile.clone(),
            loading: data.loading,
            bootstrapped: self.is_bootstrapped(),
            last_error: data.last_error.clone(),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().credential.is_some()
    }

    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.lock().credential.clone()
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.lock().profile.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Whether the one-time restore has completed. Never resets.
    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.inner.restore.initialized()
    }

    /// Register a callback invoked with a fresh snapshot after every change.
    pub fn watch<F>(&self, listener: F)
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    /// Replace the credential and mirror it to the store.
    ///
    /// Clearing the credential also clears the profile; setting one leaves
    /// the profile for `fetch_profile` to replace.
    pub fn set_credential(&self, credential: Option<String>) {
        self.update(|data| {
            self.inner.store.write(credential.as_deref());
            if credential.is_none() {
                data.profile = None;
            }
            data.credential = credential;
        });
    }

    /// Resolve the profile for the current credential.
    ///
    /// Without a credential this clears the profile and returns `Ok(None)`
    /// without a network call. Failures never change the credential.
    ///
    /// # Errors
    ///
    /// Propagates the profile lookup failure unchanged.
    pub async fn fetch_profile(&self) -> Result<Option<UserProfile>, ApiError> {
        let Some(token) = self.credential() else {
            self.update(|data| data.profile = None);
            return Ok(None);
        };
        let profile = self.inner.backend.fetch_profile(&token).await?;
        self.update(|data| {
            // A logout that landed while the lookup was in flight wins.
            if data.credential.as_deref() == Some(token.as_str()) {
                data.profile = Some(profile.clone());
            }
        });
        Ok(Some(profile))
    }

    /// Exchange credentials for a session.
    ///
    /// Returns `false` without a request while another attempt is loading.
    /// On any failure `last_error` is set and the session is left logged out.
    pub async fn login(&self, identifier: &str, secret: &str) -> bool {
        let Some(_loading) = self.begin_attempt() else {
            return false;
        };
        match self.try_login(identifier, secret).await {
            Ok(()) => {
                log::info!("login succeeded");
                true
            }
            Err(err) => {
                let message = err.user_message(LOGIN_FAILED);
                log::warn!("login failed: {err}");
                self.update(|data| data.last_error = Some(message));
                self.set_credential(None);
                false
            }
        }
    }

    async fn try_login(&self, identifier: &str, secret: &str) -> Result<(), ApiError> {
        let token = self.inner.backend.exchange(identifier, secret).await?;
        self.set_credential(Some(token));
        self.fetch_profile().await?;
        // A forced logout may have landed during the profile lookup.
        if !self.is_authenticated() {
            return Err(ApiError::CredentialRejected { body: None });
        }
        Ok(())
    }

    /// Submit a registration. Success does not sign the user in.
    pub async fn register(&self, identifier: &str, secret: &str, display_name: Option<&str>) -> bool {
        let Some(_loading) = self.begin_attempt() else {
            return false;
        };
        let request = RegisterRequest {
            email: identifier.to_owned(),
            password: secret.to_owned(),
            full_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        };
        match self.inner.backend.register(&request).await {
            Ok(()) => {
                log::info!("registration submitted");
                true
            }
            Err(err) => {
                log::warn!("registration failed: {err}");
                self.update(|data| data.last_error = Some(err.user_message(REGISTER_FAILED)));
                false
            }
        }
    }

    /// Drop the credential and profile. Idempotent.
    pub fn logout(&self) {
        self.set_credential(None);
        log::info!("session cleared");
    }

    /// Logout triggered by the server rejecting our credential.
    pub(crate) fn force_logout(&self) {
        if self.is_authenticated() {
            log::warn!("credential rejected by server; forcing logout");
        }
        self.logout();
    }

    /// One-time restore from the persisted credential.
    ///
    /// Runs at most once per session. Concurrent callers await the same
    /// in-flight restore. If the profile lookup fails for any reason the
    /// session is logged out.
    pub async fn bootstrap(&self) {
        let mut ran = false;
        self.inner
            .restore
            .get_or_init(|| {
                ran = true;
                self.restore()
            })
            .await;
        if ran {
            self.notify();
        }
    }

    async fn restore(&self) {
        if !self.is_authenticated() {
            log::debug!("bootstrap: no persisted credential");
            return;
        }
        log::debug!("bootstrap: restoring persisted session");
        match self.fetch_profile().await {
            Ok(_) => log::info!("bootstrap: session restored"),
            Err(err) => {
                log::warn!("bootstrap: persisted credential unusable ({err}); logging out");
                self.logout();
            }
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.inner.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` under the state lock, then notify listeners outside it.
    fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let result = {
            let mut data = self.lock();
            f(&mut data)
        };
        self.notify();
        result
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if listeners.is_empty() {
            return;
        }
        let state = self.snapshot();
        for listener in listeners {
            listener(&state);
        }
    }

    /// Mark an attempt as loading. `None` if one is already in flight.
    fn begin_attempt(&self) -> Option<LoadingGuard<'_>> {
        let started = self.update(|data| {
            if data.loading {
                return false;
            }
            data.loading = true;
            data.last_error = None;
            true
        });
        started.then_some(LoadingGuard { session: self })
    }
}

/// Clears `loading` on every exit path of an attempt.
struct LoadingGuard<'a> {
    session: &'a Session,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.update(|data| data.loading = false);
    }
}
