//! Endpoint Selector Service
//!
//! Pure domain logic for choosing the order in which endpoints are visited.

use crate::domain::value_objects::Endpoint;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Randomizes the endpoint visiting order for each fetch.
///
/// Without shuffling the first configured endpoint would take every first
/// attempt, and its failure would dominate latency for all callers.
pub struct EndpointSelector;

impl EndpointSelector {
    /// Uniformly random permutation of `endpoints`.
    ///
    /// The generator is local to the call and seeded from the clock, so no
    /// process-wide random state is shared between lookups.
    pub fn order(endpoints: &[Endpoint]) -> Vec<Endpoint> {
        let mut rng = StdRng::seed_from_u64(Self::time_seed());
        Self::order_with(endpoints, &mut rng)
    }

    /// Permutation of `endpoints` drawn from `rng`.
    pub fn order_with<R: Rng + ?Sized>(endpoints: &[Endpoint], rng: &mut R) -> Vec<Endpoint> {
        let mut ordered = endpoints.to_vec();
        ordered.shuffle(rng);
        ordered
    }

    fn time_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    }
}
