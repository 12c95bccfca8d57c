//! stns-fetch Library
//!
//! Resilient attribute lookups against a set of directory service endpoints,
//! with back-off state shared between processes through lock files.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use adapters::outbound::{ClientConfig, FileLockStore, LockStoreConfig, ReqwestEndpointClient};
pub use application::FetchService;
pub use config::{load_config, Config, ConfigError};
pub use domain::entities::Attributes;
pub use domain::errors::FetchError;
pub use domain::ports::{AttemptOutcome, EndpointClient, LockStore};
pub use domain::value_objects::{ApiPath, Endpoint};
