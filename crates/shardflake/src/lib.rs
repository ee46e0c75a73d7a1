//! Coordination-free, roughly time-ordered 64-bit identifiers.
//!
//! A [`ShardflakeId`] packs three fields into one signed 64-bit integer:
//!
//! ```text
//!  Bit Index:  63             23 22           20 19           10 9             0
//!              +----------------+---------------+---------------+---------------+
//!  Field:      | timestamp (41) | reserved (3)  | shard ID (10) | sequence (10) |
//!              +----------------+---------------+---------------+---------------+
//!              |<------ MSB ------------- 64 bits -------------- LSB ---------->|
//! ```
//!
//! The timestamp is the number of milliseconds elapsed since a caller-chosen
//! epoch. Every generator in a fleet is configured with a distinct shard ID,
//! so IDs never collide across shards, and a per-millisecond sequence
//! disambiguates IDs minted by one generator within the same millisecond.
//!
//! # Example
//!
//! ```
//! use shardflake::{CUSTOM_EPOCH, IdGenerator};
//!
//! let generator = IdGenerator::new(CUSTOM_EPOCH, 7)?;
//!
//! let a = generator.mint()?;
//! let b = generator.mint()?;
//!
//! assert!(a < b);
//! assert_eq!(a.shard_id(), 7);
//! # Ok::<(), shardflake::Error>(())
//! ```
//!
//! # Features
//!
//! - `parking-lot`: guard generator state with a non-poisoning
//!   [`parking_lot::Mutex`](https://docs.rs/parking_lot).
//! - `cache-padded`: pad the shared state to a cache line.
//! - `tracing`: emit spans and events through [`tracing`](https://docs.rs/tracing).
//! - `serde`: (de)serialize [`ShardflakeId`] and [`GeneratorConfig`].
//! - `async-tokio` / `async-smol`: mint from async tasks without holding the
//!   lock while waiting for the next millisecond.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod id;
#[cfg(feature = "serde")]
pub mod serde;
mod status;
mod time;

pub use crate::error::*;
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::status::*;
pub use crate::time::*;
