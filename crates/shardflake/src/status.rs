use crate::ShardflakeId;

/// Represents the result of a single, non-blocking mint attempt.
///
/// This type models the outcome of [`IdGenerator::poll_mint`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully minted.
/// - [`IdGenStatus::Pending`] means the sequence for the current millisecond is
///   exhausted and no ID can be minted until the clock reaches `yield_until`.
///
/// This allows non-blocking generation loops and async backoff.
///
/// # Example
///
/// ```
/// use shardflake::{IdGenStatus, IdGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> i64 {
///         1_000_042
///     }
/// }
///
/// let generator = IdGenerator::with_clock(1_000_000, 5, FixedTime)?;
/// match generator.poll_mint()? {
///     IdGenStatus::Ready { id } => assert_eq!(id.to_raw(), 352_326_656),
///     IdGenStatus::Pending { yield_until } => println!("back off until {yield_until}"),
/// }
/// # Ok::<(), shardflake::Error>(())
/// ```
///
/// [`IdGenerator::poll_mint`]: crate::IdGenerator::poll_mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was minted and is ready to use.
    Ready {
        /// The minted ID.
        id: ShardflakeId,
    },
    /// The sequence has been exhausted for the current millisecond.
    ///
    /// Wait until the clock reaches `yield_until` before trying again.
    Pending {
        /// The next timestamp (ms since the generator epoch, inclusive) at
        /// which minting may resume.
        yield_until: i64,
    },
}
