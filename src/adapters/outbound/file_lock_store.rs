//! File Lock Store
//!
//! Implements LockStore with one small file per endpoint, so back-off state
//! is shared by every process that points at the same directory. Short-lived
//! invocations that perform a single lookup still skip endpoints another
//! invocation saw failing moments ago.

use super::lock_record::{LockRecord, LockRecordError};
use crate::domain::ports::LockStore;
use crate::domain::value_objects::Endpoint;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Lock store configuration.
#[derive(Debug, Clone)]
pub struct LockStoreConfig {
    /// Directory holding the lock records
    pub dir: PathBuf,
    /// Back-off window after a failure
    pub lock_time: Duration,
    /// File name prefix, followed by the endpoint digest
    pub file_prefix: String,
}

impl Default for LockStoreConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
            lock_time: Duration::from_secs(30),
            file_prefix: "stns-fetch.".to_string(),
        }
    }
}

/// Failure to read a lock record.
#[derive(Debug, thiserror::Error)]
pub enum LockReadError {
    #[error("failed to read lock record: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt lock record: {0}")]
    Corrupt(#[from] LockRecordError),
}

/// File-backed lock store.
pub struct FileLockStore {
    config: LockStoreConfig,
}

impl FileLockStore {
    pub fn new(config: LockStoreConfig) -> Self {
        Self { config }
    }

    /// Path of the lock record for `endpoint`.
    ///
    /// The name is the configured prefix plus the hex SHA-256 of the endpoint
    /// string, which keeps URL characters out of the file name.
    pub fn record_path(&self, endpoint: &Endpoint) -> PathBuf {
        let digest = hex::encode(Sha256::digest(endpoint.as_str().as_bytes()));
        self.config
            .dir
            .join(format!("{}{}", self.config.file_prefix, digest))
    }

    /// Read the lock record for `endpoint`, if one exists.
    pub fn read_record(&self, endpoint: &Endpoint) -> Result<Option<LockRecord>, LockReadError> {
        let buf = match fs::read(self.record_path(endpoint)) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(LockRecord::decode(&buf)?))
    }

    /// Atomically replace the lock record for `endpoint`.
    ///
    /// The record is written to a temporary file in the lock directory and
    /// renamed over the target, so readers see either the old or the new
    /// record.
    pub fn write_record(&self, endpoint: &Endpoint, record: LockRecord) -> io::Result<()> {
        fs::create_dir_all(&self.config.dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{}", self.config.file_prefix))
            .tempfile_in(&self.config.dir)?;
        tmp.write_all(&record.encode())?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }

        tmp.persist(self.record_path(endpoint))
            .map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove the lock record for `endpoint`.
    ///
    /// Returns whether a record existed.
    pub fn clear(&self, endpoint: &Endpoint) -> io::Result<bool> {
        match fs::remove_file(self.record_path(endpoint)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Eligibility of `endpoint` at Unix time `now`.
    pub fn is_eligible_at(&self, endpoint: &Endpoint, now: i64) -> bool {
        let path = self.record_path(endpoint);

        match self.read_record(endpoint) {
            Ok(None) => true,
            Ok(Some(record)) if record.is_stale(now, self.lock_time_secs()) => {
                tracing::info!(
                    "removing stale lock record for {} (failed_at={} now={})",
                    endpoint,
                    record.failed_at(),
                    now
                );
                Self::remove_quietly(&path);
                true
            }
            Ok(Some(record)) => {
                tracing::debug!(
                    "endpoint {} locked since unix_time={}",
                    endpoint,
                    record.failed_at()
                );
                false
            }
            Err(e) => {
                tracing::warn!("discarding lock record {}: {}", path.display(), e);
                Self::remove_quietly(&path);
                true
            }
        }
    }

    /// Record a failure of `endpoint` at Unix time `now`.
    ///
    /// Write errors are logged and swallowed.
    pub fn record_failure_at(&self, endpoint: &Endpoint, now: i64) {
        match self.write_record(endpoint, LockRecord::new(now)) {
            Ok(()) => {
                tracing::info!("created lock record for {} unix_time={}", endpoint, now);
            }
            Err(e) => {
                tracing::warn!("failed to write lock record for {}: {}", endpoint, e);
            }
        }
    }

    fn lock_time_secs(&self) -> i64 {
        i64::try_from(self.config.lock_time.as_secs()).unwrap_or(i64::MAX)
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }

    fn remove_quietly(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("failed to remove lock record {}: {}", path.display(), e);
            }
        }
    }
}

impl LockStore for FileLockStore {
    fn is_eligible(&self, endpoint: &Endpoint) -> bool {
        self.is_eligible_at(endpoint, Self::now())
    }

    fn record_failure(&self, endpoint: &Endpoint) {
        self.record_failure_at(endpoint, Self::now())
    }
}
