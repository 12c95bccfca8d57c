//! Fetch errors
//!
//! Per-endpoint errors (`InvalidRequest`, `Transport`) are recovered by the
//! fetch loop; only the most recent one reaches the caller once every
//! endpoint has been tried.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Target URL could not be built for an endpoint.
    #[error("invalid request url {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    /// Connect, TLS, timeout or body read failure against an endpoint.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    /// Every endpoint was skipped by back-off; none was attempted.
    #[error("all {skipped} endpoints are backed off after recent failures")]
    AllEndpointsBackedOff { skipped: usize },

    #[error("no api endpoints configured")]
    NoEndpoints,

    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] BoxError),

    /// Response body was not a JSON attribute object.
    #[error("failed to decode attributes: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn transport(endpoint: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// Whether this error should put the endpoint into back-off.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the caller should retry later rather than treat the entity as absent.
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::AllEndpointsBackedOff { .. }
        )
    }
}
