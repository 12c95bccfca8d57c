//! Lock record wire format
//!
//! A record is the Unix time (seconds) of an endpoint's last failure, stored
//! as a zig-zag varint and zero-padded to `MAX_VARINT_LEN64` bytes.

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN64: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockRecordError {
    #[error("lock record is empty")]
    Empty,
    #[error("lock record varint is truncated")]
    Truncated,
    #[error("lock record varint overflows 64 bits")]
    Overflow,
    #[error("lock record has {0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

/// Last observed failure of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRecord {
    failed_at: i64,
}

impl LockRecord {
    pub fn new(failed_at: i64) -> Self {
        Self { failed_at }
    }

    /// Unix time of the failure, in seconds.
    pub fn failed_at(&self) -> i64 {
        self.failed_at
    }

    /// Whether the record lies outside `[now - lock_time, now + lock_time]`.
    ///
    /// Expired records and records written by a clock far ahead of ours are
    /// both stale.
    pub fn is_stale(&self, now: i64, lock_time: i64) -> bool {
        now > self.failed_at.saturating_add(lock_time)
            || self.failed_at > now.saturating_add(lock_time)
    }

    pub fn encode(&self) -> [u8; MAX_VARINT_LEN64] {
        let mut buf = [0u8; MAX_VARINT_LEN64];

        let mut ux = (self.failed_at as u64) << 1;
        if self.failed_at < 0 {
            ux = !ux;
        }

        let mut i = 0;
        while ux >= 0x80 {
            buf[i] = (ux as u8) | 0x80;
            ux >>= 7;
            i += 1;
        }
        buf[i] = ux as u8;

        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, LockRecordError> {
        if buf.is_empty() {
            return Err(LockRecordError::Empty);
        }

        let (ux, read) = read_uvarint(buf)?;

        let trailing = buf[read..].iter().filter(|b| **b != 0).count();
        if trailing > 0 {
            return Err(LockRecordError::TrailingBytes(trailing));
        }

        let mut x = (ux >> 1) as i64;
        if ux & 1 != 0 {
            x = !x;
        }
        Ok(Self::new(x))
    }
}

fn read_uvarint(buf: &[u8]) -> Result<(u64, usize), LockRecordError> {
    let mut x: u64 = 0;
    let mut shift = 0u32;

    for (i, &b) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN64 {
            return Err(LockRecordError::Overflow);
        }
        if b < 0x80 {
            if i == MAX_VARINT_LEN64 - 1 && b > 1 {
                return Err(LockRecordError::Overflow);
            }
            return Ok((x | (u64::from(b) << shift), i + 1));
        }
        x |= u64::from(b & 0x7f) << shift;
        shift += 7;
    }

    Err(LockRecordError::Truncated)
}
