use core::{fmt, str::FromStr};

use crate::{Error, Result};

/// A 64-bit Snowflake-style ID partitioned by shard.
///
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 3 bits reserved (always zero)
/// - 10 bits shard ID
/// - 10 bits sequence
///
/// ```text
///  Bit Index:  63             23 22           20 19           10 9             0
///              +----------------+---------------+---------------+---------------+
///  Field:      | timestamp (41) | reserved (3)  | shard ID (10) | sequence (10) |
///              +----------------+---------------+---------------+---------------+
///              |<------ MSB ------------- 64 bits -------------- LSB ---------->|
/// ```
///
/// The top bit of the timestamp field is the sign bit of the underlying
/// `i64`. IDs stay positive, and therefore ordered by mint time, only while
/// the timestamp is at most [`MAX_TIMESTAMP`], roughly 34.8 years after the
/// epoch. That is the operational lifetime of an epoch; it is not checked at
/// runtime.
///
/// [`MAX_TIMESTAMP`]: Self::MAX_TIMESTAMP
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "i64", into = "i64")
)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ShardflakeId {
    id: i64,
}

impl ShardflakeId {
    /// Width of the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;

    /// Width of the reserved gap between timestamp and shard ID.
    pub const RESERVED_BITS: u32 = 3;

    /// Width of the shard ID field.
    pub const SHARD_ID_BITS: u32 = 10;

    /// Width of the sequence field.
    pub const SEQUENCE_BITS: u32 = 10;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 23
    /// through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for the reserved bits. Occupies bits 20 through 22.
    pub const RESERVED_MASK: u64 = (1 << Self::RESERVED_BITS) - 1;

    /// Bitmask for extracting the 10-bit shard ID field. Occupies bits 10
    /// through 19.
    pub const SHARD_ID_MASK: u64 = (1 << Self::SHARD_ID_BITS) - 1;

    /// Bitmask for extracting the 10-bit sequence field. Occupies bits 0
    /// through 9.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 23).
    pub const TIMESTAMP_SHIFT: u32 = 23;

    /// Number of bits to shift the reserved field (bit 20).
    pub const RESERVED_SHIFT: u32 = 20;

    /// Number of bits to shift the shard ID to its correct position (bit 10).
    pub const SHARD_ID_SHIFT: u32 = 10;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u32 = 0;

    /// Largest timestamp that keeps the sign bit clear.
    pub const MAX_TIMESTAMP: i64 = (1 << (Self::TIMESTAMP_BITS - 1)) - 1;

    /// Largest representable shard ID (1023).
    pub const MAX_SHARD_ID: u16 = Self::SHARD_ID_MASK as u16;

    /// Largest representable sequence value (1023).
    pub const MAX_SEQUENCE: u16 = Self::SEQUENCE_MASK as u16;

    /// Packs the three fields into an ID, masking each to its width.
    ///
    /// Any timestamp that fits the 41-bit field is accepted. Past
    /// [`MAX_TIMESTAMP`](Self::MAX_TIMESTAMP) the sign bit is set and the ID
    /// is no longer [valid](Self::is_valid), but it still decodes.
    ///
    /// ```
    /// use shardflake::ShardflakeId;
    ///
    /// let id = ShardflakeId::from_components(42, 5, 0);
    /// assert_eq!(id.to_raw(), (42 << 23) | (5 << 10));
    /// assert_eq!(id.timestamp(), 42);
    /// assert_eq!(id.shard_id(), 5);
    /// assert_eq!(id.sequence(), 0);
    /// ```
    pub const fn from_components(timestamp: i64, shard_id: u16, sequence: u16) -> Self {
        debug_assert!(
            timestamp >= 0 && (timestamp as u64) <= Self::TIMESTAMP_MASK,
            "timestamp overflow"
        );
        debug_assert!(shard_id <= Self::MAX_SHARD_ID, "shard_id overflow");
        debug_assert!(sequence <= Self::MAX_SEQUENCE, "sequence overflow");

        let timestamp = ((timestamp as u64) & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let shard_id = ((shard_id as u64) & Self::SHARD_ID_MASK) << Self::SHARD_ID_SHIFT;
        let sequence = ((sequence as u64) & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: (timestamp | shard_id | sequence) as i64,
        }
    }

    /// Wraps a raw value without validation. See [`Self::is_valid`] and the
    /// [`TryFrom<i64>`] impl for a checked conversion.
    pub const fn from_raw(raw: i64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw signed integer.
    pub const fn to_raw(&self) -> i64 {
        self.id
    }

    /// Extracts the timestamp (ms since the epoch) from the packed ID.
    pub const fn timestamp(&self) -> i64 {
        (((self.id as u64) >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK) as i64
    }

    /// Extracts the shard ID from the packed ID.
    pub const fn shard_id(&self) -> u16 {
        (((self.id as u64) >> Self::SHARD_ID_SHIFT) & Self::SHARD_ID_MASK) as u16
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u16 {
        (((self.id as u64) >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u16
    }

    /// Milliseconds since the Unix epoch at which this ID was minted, given
    /// the epoch of the generator that minted it.
    pub const fn unix_millis(&self, epoch_millis: i64) -> i64 {
        epoch_millis + self.timestamp()
    }

    /// Returns `true` if neither the sign bit nor any reserved bit is set.
    ///
    /// Every ID minted within the operational lifetime of its epoch is valid.
    pub const fn is_valid(&self) -> bool {
        let reserved = ((self.id as u64) >> Self::RESERVED_SHIFT) & Self::RESERVED_MASK;
        self.id >= 0 && reserved == 0
    }

    /// Returns `true` if the sequence can be incremented within the same
    /// millisecond.
    pub(crate) const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::MAX_SEQUENCE
    }

    /// Returns a new ID with the sequence incremented.
    pub(crate) const fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.shard_id(), self.sequence() + 1)
    }

    /// Returns a new ID for a newer timestamp with the sequence reset to zero.
    pub(crate) const fn rollover_to_timestamp(&self, timestamp: i64) -> Self {
        Self::from_components(timestamp, self.shard_id(), 0)
    }

    /// Returns the ID as a zero-padded 19-digit string, so that string order
    /// matches numeric order for valid IDs.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.id)
    }
}

impl From<ShardflakeId> for i64 {
    fn from(id: ShardflakeId) -> Self {
        id.to_raw()
    }
}

impl TryFrom<i64> for ShardflakeId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        let id = Self::from_raw(raw);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(Error::InvalidId { raw })
        }
    }
}

impl FromStr for ShardflakeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: i64 = s.parse()?;
        Self::try_from(raw)
    }
}

impl fmt::Display for ShardflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for ShardflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("shard_id", &self.shard_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_value_round_trips_fields() {
        let id = ShardflakeId::from_components(42, 5, 0);
        assert_eq!(id.to_raw(), 352_326_656);
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.shard_id(), 5);
        assert_eq!(id.sequence(), 0);
        assert_eq!(id.unix_millis(1_000_000), 1_000_042);
    }

    #[test]
    fn fields_and_bounds() {
        let ts = ShardflakeId::MAX_TIMESTAMP;
        let shard = ShardflakeId::MAX_SHARD_ID;
        let seq = ShardflakeId::MAX_SEQUENCE;

        let id = ShardflakeId::from_components(ts, shard, seq);
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.shard_id(), shard);
        assert_eq!(id.sequence(), seq);
        assert!(id.to_raw() > 0);
        assert!(id.is_valid());
        assert_eq!(ShardflakeId::from_raw(id.to_raw()), id);
    }

    #[test]
    fn fields_do_not_bleed_into_each_other() {
        let shard_only = ShardflakeId::from_components(0, ShardflakeId::MAX_SHARD_ID, 0);
        assert_eq!(shard_only.timestamp(), 0);
        assert_eq!(shard_only.sequence(), 0);

        let seq_only = ShardflakeId::from_components(0, 0, ShardflakeId::MAX_SEQUENCE);
        assert_eq!(seq_only.shard_id(), 0);
        assert_eq!(seq_only.timestamp(), 0);

        let ts_only = ShardflakeId::from_components(1, 0, 0);
        assert_eq!(ts_only.to_raw(), 1 << 23);
        assert_eq!(ts_only.shard_id(), 0);
    }

    #[test]
    fn ordering_follows_timestamp_then_sequence() {
        let a = ShardflakeId::from_components(10, 1023, 1023);
        let b = ShardflakeId::from_components(11, 0, 0);
        let c = ShardflakeId::from_components(11, 0, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn reserved_and_sign_bits_are_invalid() {
        assert!(!ShardflakeId::from_raw(1 << 20).is_valid());
        assert!(!ShardflakeId::from_raw(1 << 22).is_valid());
        assert!(!ShardflakeId::from_raw(-1).is_valid());
        assert_eq!(
            ShardflakeId::try_from(1_i64 << 21),
            Err(Error::InvalidId { raw: 1 << 21 })
        );
        assert!(ShardflakeId::try_from(352_326_656).is_ok());
    }

    #[test]
    fn sequence_helpers() {
        let id = ShardflakeId::from_components(7, 3, 0);
        let next = id.increment_sequence();
        assert_eq!(next.sequence(), 1);
        assert_eq!(next.timestamp(), 7);
        assert_eq!(next.shard_id(), 3);
        assert!(next.has_sequence_room());

        let full = ShardflakeId::from_components(7, 3, ShardflakeId::MAX_SEQUENCE);
        assert!(!full.has_sequence_room());

        let rolled = full.rollover_to_timestamp(8);
        assert_eq!(rolled.timestamp(), 8);
        assert_eq!(rolled.sequence(), 0);
        assert_eq!(rolled.shard_id(), 3);
    }

    #[test]
    fn parses_and_displays_decimal() {
        let id: ShardflakeId = "352326656".parse().unwrap();
        assert_eq!(id.to_string(), "352326656");
        assert_eq!(id.to_padded_string(), "0000000000352326656");
        assert!(matches!("abc".parse::<ShardflakeId>(), Err(Error::Parse(_))));
        assert!(matches!(
            "-5".parse::<ShardflakeId>(),
            Err(Error::InvalidId { raw: -5 })
        ));
    }

    #[test]
    fn debug_shows_fields() {
        let id = ShardflakeId::from_components(42, 5, 3);
        let s = format!("{id:?}");
        assert!(s.contains("timestamp: 42"));
        assert!(s.contains("shard_id: 5"));
        assert!(s.contains("sequence: 3"));
    }

    #[test]
    #[should_panic(expected = "shard_id overflow")]
    fn shard_id_overflow_panics() {
        ShardflakeId::from_components(0, ShardflakeId::MAX_SHARD_ID + 1, 0);
    }

    #[test]
    #[should_panic(expected = "sequence overflow")]
    fn sequence_overflow_panics() {
        ShardflakeId::from_components(0, 0, ShardflakeId::MAX_SEQUENCE + 1);
    }

    #[test]
    #[should_panic(expected = "timestamp overflow")]
    fn timestamp_overflow_panics() {
        ShardflakeId::from_components(ShardflakeId::TIMESTAMP_MASK as i64 + 1, 0, 0);
    }

    #[test]
    fn timestamp_past_sign_bit_still_decodes() {
        let ts = ShardflakeId::MAX_TIMESTAMP + 1;
        let id = ShardflakeId::from_components(ts, 2, 3);
        assert!(id.to_raw() < 0);
        assert!(!id.is_valid());
        assert_eq!(id.timestamp(), ts);
        assert_eq!(id.shard_id(), 2);
        assert_eq!(id.sequence(), 3);
    }
}
