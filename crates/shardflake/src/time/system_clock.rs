use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// A time source that reads the operating system's wall clock on every call.
///
/// The wall clock can be stepped backward (NTP corrections, manual changes),
/// which generators report as [`Error::ClockRegression`]. Prefer
/// [`MonotonicClock`] unless timestamps must track every clock adjustment.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_millis()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
        }
    }
}
