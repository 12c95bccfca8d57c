//! Fetch Service - Main application use case
//!
//! Orchestrates a lookup: orders endpoints, consults the lock store, attempts
//! each eligible endpoint in turn and decodes the first successful body.

use crate::adapters::outbound::{ClientConfig, FileLockStore, ReqwestEndpointClient};
use crate::config::Config;
use crate::domain::entities::Attributes;
use crate::domain::errors::FetchError;
use crate::domain::ports::{AttemptOutcome, EndpointClient, LockStore};
use crate::domain::services::{AttributeDecoder, EndpointSelector};
use crate::domain::value_objects::{ApiPath, Endpoint};
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Fetch service - main application use case.
///
/// Endpoints are tried strictly one after another in a fresh random order.
/// The first HTTP 200 wins and the remaining endpoints are not contacted.
/// Transport failures put the endpoint into back-off through the lock store;
/// non-200 answers do not.
pub struct FetchService {
    endpoints: Vec<Endpoint>,
    client: Arc<dyn EndpointClient>,
    lock_store: Arc<dyn LockStore>,
    order_seed: Option<u64>,
}

impl FetchService {
    /// Create a new fetch service from its ports.
    pub fn new(
        endpoints: Vec<Endpoint>,
        client: Arc<dyn EndpointClient>,
        lock_store: Arc<dyn LockStore>,
    ) -> Result<Self, FetchError> {
        if endpoints.is_empty() {
            return Err(FetchError::NoEndpoints);
        }

        Ok(Self {
            endpoints,
            client,
            lock_store,
            order_seed: None,
        })
    }

    /// Wire the reqwest client and file lock store described by `cfg`.
    pub fn from_config(cfg: &Config) -> Result<Self, FetchError> {
        let client = ReqwestEndpointClient::new(&cfg.client_config())?;
        let lock_store = FileLockStore::new(cfg.lock_store_config());

        Self::new(cfg.endpoints(), Arc::new(client), Arc::new(lock_store))
    }

    /// Like `from_config`, with an explicit client configuration.
    pub fn with_client_config(
        endpoints: Vec<Endpoint>,
        client_config: &ClientConfig,
        lock_store: Arc<dyn LockStore>,
    ) -> Result<Self, FetchError> {
        let client = ReqwestEndpointClient::new(client_config)?;
        Self::new(endpoints, Arc::new(client), lock_store)
    }

    /// Visit endpoints in the fixed order drawn from `seed` on every lookup.
    ///
    /// Intended for reproducible runs; without it each lookup shuffles afresh.
    pub fn with_order_seed(mut self, seed: u64) -> Self {
        self.order_seed = Some(seed);
        self
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    fn visiting_order(&self) -> Vec<Endpoint> {
        match self.order_seed {
            Some(seed) => {
                EndpointSelector::order_with(&self.endpoints, &mut StdRng::seed_from_u64(seed))
            }
            None => EndpointSelector::order(&self.endpoints),
        }
    }

    /// Fetch the raw body for `path`.
    ///
    /// Returns the body of the first endpoint answering 200. When every
    /// endpoint has been visited without success:
    /// - the most recent per-endpoint error, if there was any;
    /// - an empty body if some endpoint answered with another status, which
    ///   decodes to empty attributes ("not found");
    /// - `FetchError::AllEndpointsBackedOff` if no endpoint was attempted.
    pub async fn get_raw(&self, path: &ApiPath) -> Result<Bytes, FetchError> {
        let mut last_error: Option<FetchError> = None;
        let mut answered = false;
        let mut skipped = 0usize;

        for endpoint in self.visiting_order() {
            if !self.lock_store.is_eligible(&endpoint) {
                tracing::debug!("skipping {} (backed off)", endpoint);
                skipped += 1;
                continue;
            }

            match self.client.attempt(&endpoint, path).await {
                Ok(AttemptOutcome::Found(body)) => {
                    tracing::debug!("fetched {} from {} ({} bytes)", path, endpoint, body.len());
                    return Ok(body);
                }
                Ok(AttemptOutcome::NotFound(_)) => {
                    answered = true;
                }
                Err(e) => {
                    if e.is_transport() {
                        tracing::warn!("{}", e);
                        self.lock_store.record_failure(&endpoint);
                    } else {
                        tracing::warn!("skipping {}: {}", endpoint, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None if answered => Ok(Bytes::new()),
            None => {
                tracing::warn!("no endpoint attempted for {}, all {} backed off", path, skipped);
                Err(FetchError::AllEndpointsBackedOff { skipped })
            }
        }
    }

    /// Fetch and decode the attributes for `path`.
    ///
    /// Decode failures are returned as-is; other endpoints are not retried.
    pub async fn get(&self, path: &ApiPath) -> Result<Attributes, FetchError> {
        let body = self.get_raw(path).await?;
        AttributeDecoder::decode(&body)
    }
}
