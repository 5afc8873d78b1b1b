//! Client configuration
//!
//! Use the builder setters, or read everything from the environment:
//!
//! | variable | default |
//! |---|---|
//! | `HYDROGEN_API_URL` | `http://localhost:8000` |
//! | `HYDROGEN_SESSION` | `default` |
//! | `HYDROGEN_SESSION_TOKEN` | unset |
//! | `HYDROGEN_CONNECT_TIMEOUT_SECS` | `10` |

use std::time::Duration;

use thiserror::Error;

use crate::client::DEFAULT_BASE_URL;
use crate::models::DEFAULT_SESSION_ID;

pub const ENV_API_URL: &str = "HYDROGEN_API_URL";
pub const ENV_SESSION: &str = "HYDROGEN_SESSION";
pub const ENV_SESSION_TOKEN: &str = "HYDROGEN_SESSION_TOKEN";
pub const ENV_CONNECT_TIMEOUT: &str = "HYDROGEN_CONNECT_TIMEOUT_SECS";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be an http(s) URL, got '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_id: String,
    /// Value of the `session_token` cookie
    pub session_token: Option<String>,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            session_token: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; unset or blank values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(session) = get(ENV_SESSION) {
            config.session_id = session;
        }
        config.session_token = get(ENV_SESSION_TOKEN);
        if let Some(raw) = get(ENV_CONNECT_TIMEOUT) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout {
                    name: ENV_CONNECT_TIMEOUT,
                    value: raw.clone(),
                })?;
            config.connect_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                name: ENV_API_URL,
                value: self.base_url.clone(),
            });
        }
        if self.session_id.trim().is_empty() {
            return Err(ConfigError::Empty { name: ENV_SESSION });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.session_id, "default");
        assert!(config.session_token.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_all_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://chat.example.com"),
            (ENV_SESSION, "session-1"),
            (ENV_SESSION_TOKEN, "abc"),
            (ENV_CONNECT_TIMEOUT, "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://chat.example.com");
        assert_eq!(config.session_id, "session-1");
        assert_eq!(config.session_token.as_deref(), Some("abc"));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config =
            ClientConfig::from_lookup(lookup(&[(ENV_SESSION_TOKEN, "  "), (ENV_SESSION, "")]))
                .unwrap();
        assert!(config.session_token.is_none());
        assert_eq!(config.session_id, "default");
    }

    #[test]
    fn test_invalid_timeout() {
        for value in ["zero", "0", "-1"] {
            let err =
                ClientConfig::from_lookup(lookup(&[(ENV_CONNECT_TIMEOUT, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }));
        }
    }

    #[test]
    fn test_invalid_url() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "localhost:8000")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "HYDROGEN_API_URL must be an http(s) URL, got 'localhost:8000'"
        );
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_base_url("http://10.0.0.2:8000")
            .with_session_id("s")
            .with_session_token("t")
            .with_connect_timeout(Duration::from_secs(1));
        assert!(config.validate().is_ok());
        assert_eq!(config.session_token.as_deref(), Some("t"));
    }
}
