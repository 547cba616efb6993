//! Durable mirror of the bearer credential.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only `Session` reads or writes a store. Reads must be synchronous so the
//! session can seed itself before the first route renders.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use std::sync::{Mutex, PoisonError};

/// Single-entry key/value durability for the bearer credential.
pub trait CredentialStore: Send + Sync {
    /// Persisted credential, if any. Blank entries count as absent.
    fn read(&self) -> Option<String>;

    /// Persist `credential`, or remove the entry when `None`.
    fn write(&self, credential: Option<&str>);
}

/// Process-local store for SSR and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entry: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn with_credential(credential: &str) -> Self {
        Self { entry: Mutex::new(Some(credential.to_owned())) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read(&self) -> Option<String> {
        self.entry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|c| !c.is_empty())
    }

    fn write(&self, credential: Option<&str>) {
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = credential.map(str::to_owned);
    }
}

/// `window.localStorage` store under a fixed key.
///
/// Storage failures (private mode, quota) are logged and otherwise ignored:
/// the in-memory session stays authoritative for the current page.
#[derive(Debug, Clone)]
pub struct BrowserCredentialStore {
    key: String,
}

impl BrowserCredentialStore {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl CredentialStore for BrowserCredentialStore {
    fn read(&self) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
            storage.get_item(&self.key).ok().flatten().filter(|c| !c.is_empty())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    fn write(&self, credential: Option<&str>) {
        #[cfg(feature = "hydrate")]
        {
            let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
                log::warn!("localStorage unavailable; credential not persisted");
                return;
            };
            let result = match credential {
                Some(value) => storage.set_item(&self.key, value),
                None => storage.remove_item(&self.key),
            };
            if result.is_err() {
                log::warn!("localStorage write failed for key {}", self.key);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = credential;
        }
    }
}
