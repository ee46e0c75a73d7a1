//! Error types for constructing generators and minting IDs.
//!
//! Construction fails only on an out-of-range shard ID. Minting fails when the
//! clock misbehaves (it moved backward, or it reports a time before the
//! configured epoch) or, with the std mutex, when another thread panicked while
//! holding the generator lock. Exhausting the per-millisecond sequence is not
//! an error: it only shows up as latency.

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `shardflake` can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The shard ID does not fit in its 10-bit field.
    ///
    /// Raised at construction only. Not retryable without fixing the
    /// configuration.
    #[error("invalid shard id {shard_id}: must be at most {max}", max = crate::ShardflakeId::MAX_SHARD_ID)]
    InvalidShardId {
        /// The rejected shard ID.
        shard_id: u16,
    },

    /// The clock reported a time earlier than the timestamp of the most recent
    /// ID.
    ///
    /// Typically caused by an NTP step or a manual clock change. The generator
    /// state is left untouched, so the caller may retry after `delta_millis`.
    #[error("clock moved backwards by {delta_millis}ms; refusing to mint")]
    ClockRegression {
        /// How far behind the last minted timestamp the clock is.
        delta_millis: i64,
    },

    /// The clock reported a time before the generator's epoch.
    ///
    /// Minting would produce a negative timestamp field, so the call fails.
    #[error("clock reads {now_millis}ms since the unix epoch, before the generator epoch {epoch_millis}ms")]
    ClockBeforeEpoch {
        /// Current clock reading, in milliseconds since the Unix epoch.
        now_millis: i64,
        /// Configured generator epoch, in milliseconds since the Unix epoch.
        epoch_millis: i64,
    },

    /// A thread panicked while holding the generator lock.
    ///
    /// Not available with the `parking-lot` feature, whose mutex does not
    /// poison.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// A raw value sets the sign bit or the reserved bits of the layout.
    #[error("invalid id {raw}: sign or reserved bits set")]
    InvalidId {
        /// The rejected raw value.
        raw: i64,
    },

    /// A string is not a decimal 64-bit integer.
    #[error("failed to parse id: {0}")]
    Parse(#[from] core::num::ParseIntError),
}

impl Error {
    /// Returns `true` for errors that may clear up on their own, i.e. clock
    /// anomalies. Everything else needs a fix in configuration or input.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ClockRegression { .. } | Self::ClockBeforeEpoch { .. }
        )
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
