//! Typed generator settings for embedding in a host application's config.
//!
//! `shardflake` never reads files or environment variables itself. Hosts that
//! already deserialize their configuration can nest a [`GeneratorConfig`]
//! (with the `serde` feature) and hand it to [`GeneratorConfig::build`]:
//!
//! ```
//! # #[cfg(feature = "serde")] {
//! use shardflake::GeneratorConfig;
//!
//! let config: GeneratorConfig =
//!     serde_json::from_str(r#"{ "shard_id": 12 }"#).unwrap();
//! let generator = config.build().unwrap();
//! assert_eq!(generator.shard_id(), 12);
//! # }
//! ```

use crate::{CUSTOM_EPOCH, IdGenerator, MonotonicClock, Result, TimeSource};

/// Settings for one [`IdGenerator`].
///
/// Uniqueness across a fleet requires every concurrently running generator to
/// use a distinct `shard_id` under the same `epoch_millis`; assigning them is
/// up to the deployment.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(deny_unknown_fields)
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    /// Epoch in milliseconds since the Unix epoch. Defaults to
    /// [`CUSTOM_EPOCH`].
    #[cfg_attr(feature = "serde", serde(default = "default_epoch_millis"))]
    pub epoch_millis: i64,

    /// Shard ID in `0..=1023`.
    pub shard_id: u16,
}

#[cfg(feature = "serde")]
const fn default_epoch_millis() -> i64 {
    CUSTOM_EPOCH
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            epoch_millis: CUSTOM_EPOCH,
            shard_id: 0,
        }
    }
}

impl GeneratorConfig {
    /// Settings for `shard_id` under `epoch_millis`, validated on build.
    pub const fn new(epoch_millis: i64, shard_id: u16) -> Self {
        Self {
            epoch_millis,
            shard_id,
        }
    }

    /// Builds a generator on a fresh [`MonotonicClock`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShardId`](crate::Error::InvalidShardId) if the
    /// shard ID is out of range.
    pub fn build(&self) -> Result<IdGenerator<MonotonicClock>> {
        IdGenerator::new(self.epoch_millis, self.shard_id)
    }

    /// Builds a generator reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShardId`](crate::Error::InvalidShardId) if the
    /// shard ID is out of range.
    pub fn build_with_clock<T: TimeSource>(&self, clock: T) -> Result<IdGenerator<T>> {
        IdGenerator::with_clock(self.epoch_millis, self.shard_id, clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FixedTime;
    impl TimeSource for FixedTime {
        fn current_millis(&self) -> i64 {
            CUSTOM_EPOCH + 10
        }
    }

    #[test]
    fn default_uses_custom_epoch_and_shard_zero() {
        let config = GeneratorConfig::default();
        assert_eq!(config.epoch_millis, CUSTOM_EPOCH);
        assert_eq!(config.shard_id, 0);
    }

    #[test]
    fn build_validates_shard_id() {
        let err = GeneratorConfig::new(CUSTOM_EPOCH, 4000)
            .build_with_clock(FixedTime)
            .unwrap_err();
        assert_eq!(err, Error::InvalidShardId { shard_id: 4000 });
    }

    #[test]
    fn build_with_clock_carries_settings() {
        let generator = GeneratorConfig::new(CUSTOM_EPOCH, 9)
            .build_with_clock(FixedTime)
            .unwrap();
        assert_eq!(generator.shard_id(), 9);
        assert_eq!(generator.epoch_millis(), CUSTOM_EPOCH);
        assert_eq!(generator.mint().unwrap().timestamp(), 10);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_with_default_epoch() {
        let config: GeneratorConfig = serde_json::from_str(r#"{ "shard_id": 5 }"#).unwrap();
        assert_eq!(config, GeneratorConfig::new(CUSTOM_EPOCH, 5));

        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "epoch_millis": 1000000, "shard_id": 1023 }"#).unwrap();
        assert_eq!(config, GeneratorConfig::new(1_000_000, 1023));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn rejects_unknown_fields() {
        let res = serde_json::from_str::<GeneratorConfig>(r#"{ "shard_id": 5, "worker": 1 }"#);
        assert!(res.is_err());
    }
}
