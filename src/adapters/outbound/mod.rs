mod file_lock_store;
mod lock_record;
mod reqwest_endpoint_client;

pub use file_lock_store::{FileLockStore, LockReadError, LockStoreConfig};
pub use lock_record::{LockRecord, LockRecordError, MAX_VARINT_LEN64};
pub use reqwest_endpoint_client::{ClientConfig, ReqwestEndpointClient};
