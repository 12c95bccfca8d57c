mod endpoint_client;
mod lock_store;

pub use endpoint_client::{AttemptOutcome, EndpointClient};
pub use lock_store::LockStore;
