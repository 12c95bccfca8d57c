//! Domain Layer
//!
//! Entities, value objects, ports and pure services. Nothing here performs I/O.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::Attributes;
pub use errors::FetchError;
pub use value_objects::{ApiPath, Endpoint};
