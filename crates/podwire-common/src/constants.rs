//! Endpoint paths, environment variable names, and defaults.

/// Default engine service address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default API version segment inserted before every endpoint.
pub const DEFAULT_API_VERSION: &str = "v1.0.0";

/// Path segment separating the version from libpod endpoints.
pub const API_NAMESPACE: &str = "libpod";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Streaming lifecycle events endpoint.
pub const EVENTS_PATH: &str = "/events";

/// Whole-system prune endpoint.
pub const SYSTEM_PRUNE_PATH: &str = "/system/prune";

/// Pod prune endpoint.
pub const POD_PRUNE_PATH: &str = "/pods/prune";

/// Engine version endpoint.
pub const VERSION_PATH: &str = "/version";

/// Environment variable overriding the service address.
pub const ENV_URL: &str = "PODWIRE_URL";

/// Environment variable overriding the API version segment.
pub const ENV_API_VERSION: &str = "PODWIRE_API_VERSION";

/// Environment variable overriding the connect timeout (seconds).
pub const ENV_CONNECT_TIMEOUT: &str = "PODWIRE_CONNECT_TIMEOUT";

/// Application name used in CLI output and the user agent.
pub const APP_NAME: &str = "podwire";
