//! Application Layer
//!
//! Use cases composed from domain services and ports.

mod fetch_service;

pub use fetch_service::FetchService;
