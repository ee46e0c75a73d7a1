//! Field adapters for `#[serde(with = "...")]`.
//!
//! [`ShardflakeId`] already implements `Serialize`/`Deserialize` as its native
//! `i64`. These modules cover fields that want a different wire form:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use shardflake::ShardflakeId;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Account {
//!     #[serde(with = "shardflake::serde::as_string")]
//!     id: ShardflakeId,
//! }
//!
//! let account = Account { id: ShardflakeId::from_components(42, 5, 0) };
//! let json = serde_json::to_string(&account).unwrap();
//! assert_eq!(json, r#"{"id":"352326656"}"#);
//! ```

/// Serialize an ID as its native `i64`, rejecting invalid values on the way in.
pub mod as_native {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::ShardflakeId;

    /// Serialize an ID as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &ShardflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an ID from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value sets the sign bit or the reserved bits
    pub fn deserialize<'de, D>(d: D) -> Result<ShardflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(d)?;
        ShardflakeId::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Serialize an ID as a decimal string.
///
/// Keeps IDs lossless for consumers that parse JSON numbers as doubles, which
/// are exact only up to 2^53.
pub mod as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::ShardflakeId;

    /// Serialize an ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &ShardflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a decimal 64-bit integer
    /// - The value sets the sign bit or the reserved bits
    pub fn deserialize<'de, D>(d: D) -> Result<ShardflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
