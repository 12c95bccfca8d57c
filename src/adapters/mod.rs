//! Adapters Layer
//!
//! Implementations of the domain ports against the filesystem and HTTP.

pub mod outbound;
