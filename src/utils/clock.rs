//! Time sources for block timestamps
//!
//! The timestamp is consensus data (it is hashed into the proof-of-work
//! header), so block construction takes the clock as a parameter instead of
//! reading the system time directly.

use crate::error::Result;
use crate::utils::current_timestamp;

pub trait TimeSource {
    /// Seconds since the Unix epoch.
    fn unix_timestamp(&self) -> Result<i64>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn unix_timestamp(&self) -> Result<i64> {
        current_timestamp()
    }
}

/// Always reports the same instant. Used to make mining reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl TimeSource for FixedClock {
    fn unix_timestamp(&self) -> Result<i64> {
        Ok(self.0)
    }
}
