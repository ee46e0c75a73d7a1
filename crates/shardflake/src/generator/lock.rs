use core::cmp::Ordering;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, IdGenStatus, MonotonicClock, Result, ShardflakeId, TimeSource,
    generator::{Mutex, MutexGuard},
};

/// State shared by every handle to one generator: the most recently minted
/// ID, or `None` until the first mint.
type State = Option<ShardflakeId>;

/// Outcome of one pass over the mint algorithm.
enum Step {
    Ready(ShardflakeId),
    Exhausted { last_timestamp: i64 },
}

/// A lock-based Snowflake ID generator for one shard.
///
/// The last minted ID is kept behind an [`Arc<Mutex<_>>`]. Each mint reads the
/// clock and updates the state inside one critical section, so concurrent
/// callers can never observe the same sequence value. Cloning the generator
/// yields another handle to the same state.
///
/// ## Guarantees
/// - IDs from one generator strictly increase as long as the clock does not
///   move backward.
/// - IDs from generators with distinct shard IDs never collide.
/// - Up to 1024 IDs per millisecond; past that, [`mint`] waits for the clock
///   to reach the next millisecond while holding the lock.
///
/// ## Clock regression
/// When the clock reports a time earlier than the last minted ID, [`mint`]
/// fails fast with [`Error::ClockRegression`] instead of reusing a stale
/// timestamp. The state is not modified, so retrying later is safe.
///
/// [`mint`]: Self::mint
pub struct IdGenerator<T = MonotonicClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<State>>,
    shard_id: u16,
    epoch_millis: i64,
    clock: T,
}

impl IdGenerator<MonotonicClock> {
    /// Creates a generator for `shard_id`, measuring time since
    /// `epoch_millis` (milliseconds since the Unix epoch) on a fresh
    /// [`MonotonicClock`].
    ///
    /// The epoch must lie in the past for every future call to
    /// [`mint`](Self::mint), and IDs stay positive for about 34.8 years after
    /// it (see [`ShardflakeId::MAX_TIMESTAMP`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShardId`] if `shard_id` exceeds
    /// [`ShardflakeId::MAX_SHARD_ID`].
    ///
    /// # Example
    /// ```
    /// use shardflake::{CUSTOM_EPOCH, Error, IdGenerator};
    ///
    /// assert!(IdGenerator::new(CUSTOM_EPOCH, 1023).is_ok());
    /// assert_eq!(
    ///     IdGenerator::new(CUSTOM_EPOCH, 1024).err(),
    ///     Some(Error::InvalidShardId { shard_id: 1024 }),
    /// );
    /// ```
    pub fn new(epoch_millis: i64, shard_id: u16) -> Result<Self> {
        Self::with_clock(epoch_millis, shard_id, MonotonicClock::new())
    }
}

impl<T> IdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShardId`] if `shard_id` exceeds
    /// [`ShardflakeId::MAX_SHARD_ID`].
    pub fn with_clock(epoch_millis: i64, shard_id: u16, clock: T) -> Result<Self> {
        if shard_id > ShardflakeId::MAX_SHARD_ID {
            return Err(Error::InvalidShardId { shard_id });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(shard_id, epoch_millis, "created id generator");

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(None))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(None)),
            shard_id,
            epoch_millis,
            clock,
        })
    }

    /// The shard ID encoded into every minted ID.
    pub const fn shard_id(&self) -> u16 {
        self.shard_id
    }

    /// The epoch, in milliseconds since the Unix epoch.
    pub const fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    /// The time source driving this generator.
    pub const fn clock(&self) -> &T {
        &self.clock
    }

    /// Returns the most recently minted ID, or `None` before the first mint.
    ///
    /// # Errors
    /// - Returns an error if the underlying lock has been poisoned.
    pub fn last_id(&self) -> Result<Option<ShardflakeId>> {
        Ok(*self.lock()?)
    }

    /// Mints the next ID.
    ///
    /// If 1024 IDs were already minted in the current millisecond, this spins
    /// on the clock until it advances, holding the lock the whole time. Other
    /// callers block meanwhile, which caps throughput at 1024 IDs per
    /// millisecond per generator.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock is behind the last minted ID.
    /// - [`Error::ClockBeforeEpoch`] if the clock is behind the epoch.
    /// - [`Error::LockPoisoned`] if another thread panicked while minting.
    ///
    /// # Example
    /// ```
    /// use shardflake::{CUSTOM_EPOCH, IdGenerator};
    ///
    /// let generator = IdGenerator::new(CUSTOM_EPOCH, 3)?;
    /// let ids = (0..2048)
    ///     .map(|_| generator.mint())
    ///     .collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert!(ids.windows(2).all(|w| w[0] < w[1]));
    /// # Ok::<(), shardflake::Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(shard_id = self.shard_id)))]
    pub fn mint(&self) -> Result<ShardflakeId> {
        let mut state = self.lock()?;
        let mut waiting = false;

        loop {
            match self.step(&mut state)? {
                Step::Ready(id) => return Ok(id),
                Step::Exhausted { .. } => {
                    if !waiting {
                        waiting = true;
                        #[cfg(feature = "tracing")]
                        {
                            let last_id = *state;
                            tracing::trace!(?last_id, "sequence exhausted, waiting for next millisecond");
                        }
                    }
                    core::hint::spin_loop();
                }
            }
        }
    }

    /// Mints the next ID and returns its raw signed integer.
    ///
    /// # Errors
    /// Same as [`Self::mint`].
    pub fn mint_i64(&self) -> Result<i64> {
        self.mint().map(i64::from)
    }

    /// Attempts to mint the next ID without waiting.
    ///
    /// If the sequence for the current millisecond is exhausted, returns
    /// [`IdGenStatus::Pending`] with the timestamp at which to retry and leaves
    /// the generator state untouched.
    ///
    /// # Errors
    /// Same as [`Self::mint`].
    ///
    /// # Example
    /// ```
    /// use shardflake::{CUSTOM_EPOCH, IdGenStatus, IdGenerator};
    ///
    /// let generator = IdGenerator::new(CUSTOM_EPOCH, 0)?;
    ///
    /// let id = loop {
    ///     match generator.poll_mint()? {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.shard_id(), 0);
    /// # Ok::<(), shardflake::Error>(())
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(shard_id = self.shard_id)))]
    pub fn poll_mint(&self) -> Result<IdGenStatus> {
        let mut state = self.lock()?;
        match self.step(&mut state)? {
            Step::Ready(id) => Ok(IdGenStatus::Ready { id }),
            Step::Exhausted { last_timestamp } => Ok(IdGenStatus::Pending {
                yield_until: last_timestamp + 1,
            }),
        }
    }

    /// Milliseconds elapsed since the epoch, per the generator's clock.
    pub(crate) fn elapsed_millis(&self) -> Result<i64> {
        let now_millis = self.clock.current_millis();
        let elapsed = now_millis.saturating_sub(self.epoch_millis);
        if elapsed < 0 {
            return Err(Error::ClockBeforeEpoch {
                now_millis,
                epoch_millis: self.epoch_millis,
            });
        }
        Ok(elapsed)
    }

    /// One pass over the mint algorithm. Must be called with the lock held.
    fn step(&self, state: &mut State) -> Result<Step> {
        let now = self.elapsed_millis()?;

        let Some(last) = *state else {
            let id = ShardflakeId::from_components(now, self.shard_id, 0);
            *state = Some(id);
            return Ok(Step::Ready(id));
        };

        let last_timestamp = last.timestamp();
        match now.cmp(&last_timestamp) {
            Ordering::Equal => {
                if last.has_sequence_room() {
                    let id = last.increment_sequence();
                    *state = Some(id);
                    Ok(Step::Ready(id))
                } else {
                    Ok(Step::Exhausted { last_timestamp })
                }
            }
            Ordering::Greater => {
                let id = last.rollover_to_timestamp(now);
                *state = Some(id);
                Ok(Step::Ready(id))
            }
            Ordering::Less => Err(self.cold_clock_behind(now, last_timestamp)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, now: i64, last_timestamp: i64) -> Error {
        let delta_millis = last_timestamp - now;
        debug_assert!(delta_millis > 0);

        #[cfg(feature = "tracing")]
        tracing::warn!(
            shard_id = self.shard_id,
            last_timestamp,
            delta_millis,
            "clock moved backwards"
        );

        Error::ClockRegression { delta_millis }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

impl<T> Clone for IdGenerator<T>
where
    T: TimeSource + Clone,
{
    /// Returns another handle to the same generator state.
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            shard_id: self.shard_id,
            epoch_millis: self.epoch_millis,
            clock: self.clock.clone(),
        }
    }
}

impl<T> core::fmt::Debug for IdGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("shard_id", &self.shard_id)
            .field("epoch_millis", &self.epoch_millis)
            .finish_non_exhaustive()
    }
}
