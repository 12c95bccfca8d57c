//! Endpoint Client Port
//!
//! Defines the interface for a single fetch attempt against one endpoint.

use crate::domain::errors::FetchError;
use crate::domain::value_objects::{ApiPath, Endpoint};
use async_trait::async_trait;
use bytes::Bytes;

/// Result of an attempt that reached the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// HTTP 200 with the full response body.
    Found(Bytes),
    /// The endpoint answered with any other status.
    NotFound(u16),
}

/// Client issuing one GET per call.
///
/// Errors are `FetchError::InvalidRequest` when the target URL cannot be
/// built and `FetchError::Transport` for anything that failed on the wire.
#[async_trait]
pub trait EndpointClient: Send + Sync {
    async fn attempt(&self, endpoint: &Endpoint, path: &ApiPath)
        -> Result<AttemptOutcome, FetchError>;
}
