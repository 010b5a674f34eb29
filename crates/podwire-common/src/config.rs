//! Client configuration model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{PodwireError, Result};

/// Connection settings for talking to the engine service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the service, without a trailing path.
    pub base_url: String,
    /// API version segment, e.g. `v1.0.0`.
    pub api_version: String,
    /// Upper bound on establishing the TCP connection, in seconds.
    pub connect_timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            api_version: constants::DEFAULT_API_VERSION.to_string(),
            connect_timeout_secs: constants::DEFAULT_CONNECT_TIMEOUT_SECS,
            user_agent: format!("{}/{}", constants::APP_NAME, env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::Config`] if a variable holds an invalid value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup, starting
    /// from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::Config`] if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(constants::ENV_URL) {
            config.base_url = url;
        }
        if let Some(version) = lookup(constants::ENV_API_VERSION) {
            config.api_version = version;
        }
        if let Some(raw) = lookup(constants::ENV_CONNECT_TIMEOUT) {
            config.connect_timeout_secs = raw.trim().parse().map_err(|_| PodwireError::Config {
                message: format!(
                    "{} must be a whole number of seconds, got {raw:?}",
                    constants::ENV_CONNECT_TIMEOUT
                ),
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that cannot be expressed by the type alone.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PodwireError::Config {
                message: format!("base url must use http or https: {}", self.base_url),
            });
        }
        if self.api_version.is_empty() || self.api_version.contains('/') {
            return Err(PodwireError::Config {
                message: format!("invalid api version segment: {:?}", self.api_version),
            });
        }
        Ok(())
    }

    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Full URL for an endpoint path such as `/events`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            constants::API_NAMESPACE,
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("podwire/"));
    }

    #[test]
    fn endpoint_joins_version_and_namespace() {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9000/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.endpoint("/events"),
            "http://127.0.0.1:9000/v1.0.0/libpod/events"
        );
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("PODWIRE_URL", "https://engine.internal:443"),
            ("PODWIRE_API_VERSION", "v2.0.0"),
            ("PODWIRE_CONNECT_TIMEOUT", "3"),
        ]))
        .expect("valid config");
        assert_eq!(config.base_url, "https://engine.internal:443");
        assert_eq!(config.api_version, "v2.0.0");
        assert_eq!(config.connect_timeout_secs, 3);
    }

    #[test]
    fn lookup_rejects_non_numeric_timeout() {
        let err = ClientConfig::from_lookup(lookup_from(&[("PODWIRE_CONNECT_TIMEOUT", "soon")]))
            .expect_err("timeout must be numeric");
        assert!(matches!(err, PodwireError::Config { .. }));
    }

    #[test]
    fn validate_rejects_unix_scheme() {
        let config = ClientConfig {
            base_url: "unix:///run/podman/podman.sock".into(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults_when_deserialized() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://10.0.0.2:8080"}"#).expect("parse");
        assert_eq!(config.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.api_version, "v1.0.0");
    }
}
