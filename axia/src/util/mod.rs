mod amount;

pub use amount::Amount;
use std::time::{SystemTime, UNIX_EPOCH};

/// Gets the time in seconds since UNIX_EPOCH, the unit of locktimes and validation periods.
///
/// A clock set before the epoch reads as zero.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
