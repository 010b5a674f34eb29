//! HTTP transport to the engine service.

use podwire_common::config::ClientConfig;
use podwire_common::error::PodwireError;
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// Query parameters in the order they are sent.
pub type QueryParams = Vec<(&'static str, String)>;

/// Error document the service returns with non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorModel {
    #[serde(default)]
    message: String,
    #[serde(default)]
    cause: String,
}

/// Shared handle to the engine service.
///
/// Cloning is cheap and clones share the underlying HTTP client. Every call
/// is a single request: nothing is retried.
#[derive(Debug, Clone)]
pub struct Connection {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Connection {
    /// Creates a connection from explicit settings.
    ///
    /// No request is sent until an operation is called.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::Config`] if the settings are invalid or the
    /// HTTP client cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PodwireError::Config {
                message: format!("cannot initialise http client: {e}"),
            })?;
        tracing::debug!(base_url = %config.base_url, api_version = %config.api_version, "connection configured");
        Ok(Self { http, config })
    }

    /// Creates a connection from the `PODWIRE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`PodwireError::Config`] if a variable is invalid.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Settings this connection was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends one request and returns the reply once its status line and
    /// headers have arrived. The body is left unread.
    ///
    /// Returns the endpoint URL alongside the response for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`] on transport failure and
    /// [`ClientError::Status`] on a non-success status.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> Result<(String, reqwest::Response)> {
        let endpoint = self.config.endpoint(path);
        tracing::debug!(%method, endpoint = %endpoint, params = params.len(), "sending request");

        let response = self
            .http
            .request(method, &endpoint)
            .query(params)
            .send()
            .await
            .map_err(|source| ClientError::Connection {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok((endpoint, response));
        }

        let body = response.text().await.unwrap_or_default();
        let message = status_message(&body);
        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), %message, "request rejected");
        Err(ClientError::Status {
            endpoint,
            status: status.as_u16(),
            message,
        })
    }

    /// Sends one request and decodes its whole body as a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connection`] on transport failure,
    /// [`ClientError::Status`] on a non-success status and
    /// [`ClientError::ResponseDecode`] if the body is not the expected JSON.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> Result<T> {
        let (endpoint, response) = self.send(method, path, params).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Connection {
                endpoint: endpoint.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::ResponseDecode { endpoint, source })
    }
}

/// Human-readable reason from an error reply, falling back to the raw body.
fn status_message(body: &str) -> String {
    match serde_json::from_str::<ErrorModel>(body) {
        Ok(model) if !model.message.is_empty() => model.message,
        Ok(model) if !model.cause.is_empty() => model.cause,
        _ => body.trim().to_string(),
    }
}

/// Adds `name=<bool>` only when the option was explicitly given.
pub(crate) fn push_flag(params: &mut QueryParams, name: &'static str, value: Option<bool>) {
    if let Some(value) = value {
        params.push((name, value.to_string()));
    }
}
