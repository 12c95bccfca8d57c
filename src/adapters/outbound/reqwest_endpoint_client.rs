//! Reqwest Endpoint Client
//!
//! Implements EndpointClient with one immutable reqwest client per instance.
//! TLS trust, dial timeout and keep-alive are fixed when the instance is
//! built; nothing touches process-wide transport state.

use crate::domain::errors::FetchError;
use crate::domain::ports::{AttemptOutcome, EndpointClient};
use crate::domain::value_objects::{ApiPath, Endpoint};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Basic auth user (sent only together with a password)
    pub user: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Verify server certificates
    pub ssl_verify: bool,
    /// Bound on connecting and on each whole attempt
    pub timeout: Duration,
    /// TCP keep-alive interval for pooled connections
    pub keepalive: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            ssl_verify: true,
            timeout: Duration::from_secs(3),
            keepalive: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Credentials to attach, if both user and password are non-empty.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user, password))
            }
            _ => None,
        }
    }
}

pub struct ReqwestEndpointClient {
    client: reqwest::Client,
    basic_auth: Option<(String, String)>,
}

impl ReqwestEndpointClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        if !config.ssl_verify {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.ssl_verify)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .tcp_keepalive(config.keepalive)
            .build()
            .map_err(|e| FetchError::ClientBuild(Box::new(e)))?;

        let basic_auth = config
            .basic_auth()
            .map(|(user, password)| (user.to_string(), password.to_string()));

        Ok(Self { client, basic_auth })
    }
}

#[async_trait]
impl EndpointClient for ReqwestEndpointClient {
    async fn attempt(
        &self,
        endpoint: &Endpoint,
        path: &ApiPath,
    ) -> Result<AttemptOutcome, FetchError> {
        let url = endpoint.target_url(path);
        if path.escapes_base() {
            return Err(FetchError::InvalidRequest {
                url,
                reason: "path climbs above the endpoint base".to_string(),
            });
        }
        let parsed = reqwest::Url::parse(&url).map_err(|e| FetchError::InvalidRequest {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut request = self.client.get(parsed);
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(FetchError::InvalidRequest {
                    url,
                    reason: e.to_string(),
                })
            }
            Err(e) => return Err(FetchError::transport(endpoint.as_str(), e)),
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("{} answered {} for {}", endpoint, status, path);
            return Ok(AttemptOutcome::NotFound(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(endpoint.as_str(), e))?;

        Ok(AttemptOutcome::Found(body))
    }
}
