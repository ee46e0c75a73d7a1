use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicI64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use crate::{SystemClock, TimeSource};

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicI64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source aligned to the Unix epoch.
///
/// The wall clock is sampled once at construction; from then on, time advances
/// with [`Instant`], which is immune to NTP steps and manual clock changes. A
/// generator driven by this clock never observes a backward jump.
///
/// Internally, a background thread updates a shared atomic counter once per
/// millisecond, so reading the clock is a single atomic load. The thread exits
/// once every clone of the clock has been dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor_millis: i64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock anchored to the current wall-clock time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use shardflake::{CUSTOM_EPOCH, MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.current_millis();
    ///
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// // Due to timer alignment the ticker may lag by a millisecond or so,
    /// // but it never goes backward.
    /// assert!(clock.current_millis() >= before);
    /// assert!(before > CUSTOM_EPOCH);
    /// ```
    pub fn new() -> Self {
        Self::with_anchor(SystemClock.current_millis())
    }

    /// Constructs a monotonic clock whose first reading is `anchor_millis`
    /// (milliseconds since the Unix epoch).
    pub fn with_anchor(anchor_millis: i64) -> Self {
        let start = Instant::now();
        let inner = Arc::new(SharedTickerInner {
            current: AtomicI64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms as i64, Ordering::Relaxed);

                // Align to the next tick after the current actual time
                tick = now_ms + 1;
            }
        });

        let _ = inner._handle.set(handle);

        Self {
            inner,
            anchor_millis,
        }
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the anchor plus the monotonic time elapsed since construction.
    fn current_millis(&self) -> i64 {
        self.anchor_millis + self.inner.current.load(Ordering::Relaxed)
    }
}
