//! Client configuration with build-time overrides.
//!
//! DESIGN
//! ======
//! A browser bundle has no process environment, so overrides are baked in at
//! build time through `option_env!`. Everything has a default matching the
//! backend's stock layout, so an unconfigured build just works.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "/api";
pub const DEFAULT_AUTH_BASE: &str = "/auth";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_STORAGE_KEY: &str = "access_token";
pub const DEFAULT_LOGIN_ROUTE: &str = "/";
pub const DEFAULT_LANDING_ROUTE: &str = "/app";
pub const DEFAULT_ACCESS_DENIED_ROUTE: &str = "/forbidden";

/// Errors produced while reading configuration overrides.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Typed client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base path of the authenticated API channel.
    pub api_base: String,
    /// Base path of the login/profile/registration endpoints.
    pub auth_base: String,
    /// Uniform timeout applied to every request.
    pub request_timeout: Duration,
    /// `localStorage` key holding the bearer credential.
    pub storage_key: String,
    /// Guest-only route that hosts the login form.
    pub login_route: String,
    /// Route authenticated users land on.
    pub landing_route: String,
    /// Route shown when an authenticated user lacks privilege.
    pub access_denied_route: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            auth_base: DEFAULT_AUTH_BASE.to_owned(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            login_route: DEFAULT_LOGIN_ROUTE.to_owned(),
            landing_route: DEFAULT_LANDING_ROUTE.to_owned(),
            access_denied_route: DEFAULT_ACCESS_DENIED_ROUTE.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build config from values captured at compile time.
    ///
    /// Recognized:
    /// - `OPTOOL_API_BASE`: default `/api`
    /// - `OPTOOL_AUTH_BASE`: default `/auth`
    /// - `OPTOOL_REQUEST_TIMEOUT_MS`: default 20000
    /// - `OPTOOL_STORAGE_KEY`: default `access_token`
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but unparsable.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match key {
            "OPTOOL_API_BASE" => option_env!("OPTOOL_API_BASE"),
            "OPTOOL_AUTH_BASE" => option_env!("OPTOOL_AUTH_BASE"),
            "OPTOOL_REQUEST_TIMEOUT_MS" => option_env!("OPTOOL_REQUEST_TIMEOUT_MS"),
            "OPTOOL_STORAGE_KEY" => option_env!("OPTOOL_STORAGE_KEY"),
            _ => None,
        })
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a positive integer or a string
    /// value is blank.
    pub fn from_lookup<'a, F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut config = Self::default();
        if let Some(base) = non_blank(&lookup, "OPTOOL_API_BASE")? {
            config.api_base = normalize_base(base);
        }
        if let Some(base) = non_blank(&lookup, "OPTOOL_AUTH_BASE")? {
            config.auth_base = normalize_base(base);
        }
        if let Some(key) = non_blank(&lookup, "OPTOOL_STORAGE_KEY")? {
            config.storage_key = key.to_owned();
        }
        if let Some(raw) = lookup("OPTOOL_REQUEST_TIMEOUT_MS") {
            let ms = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "OPTOOL_REQUEST_TIMEOUT_MS",
                    value: raw.to_owned(),
                })?;
            config.request_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// Absolute URL path for an authenticated API endpoint.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        join_path(&self.api_base, path)
    }

    /// Absolute URL path for an auth collaborator endpoint.
    #[must_use]
    pub fn auth_url(&self, path: &str) -> String {
        join_path(&self.auth_base, path)
    }
}

fn non_blank<'a, F>(lookup: &F, key: &'static str) -> Result<Option<&'a str>, ConfigError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::InvalidValue { key, value: raw.to_owned() }),
        Some(raw) => Ok(Some(raw.trim())),
    }
}

fn normalize_base(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() { String::new() } else { trimmed.to_owned() }
}

fn join_path(base: &str, path: &str) -> String {
    format!("{base}/{}", path.trim_start_matches('/'))
}
