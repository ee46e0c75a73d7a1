use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{IdGenStatus, IdGenerator, Result, ShardflakeId, TimeSource};

/// Extension trait for minting IDs from async tasks.
///
/// Unlike [`IdGenerator::mint`], which spins on the clock with the lock held
/// when the per-millisecond sequence runs out, the async variant releases the
/// lock and sleeps through the given [`SleepProvider`] until the next
/// millisecond, then tries again. Clock regressions still fail fast.
pub trait IdGeneratorAsyncExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Fails with the same errors as [`IdGenerator::poll_mint`].
    fn try_mint_async<S>(&self) -> impl Future<Output = Result<ShardflakeId>> + Send
    where
        S: SleepProvider;
}

impl<T> IdGeneratorAsyncExt for IdGenerator<T>
where
    T: TimeSource + Sync,
{
    fn try_mint_async<S>(&self) -> impl Future<Output = Result<ShardflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.poll_mint()? {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_until } => {
                        let now = self.elapsed_millis()?;
                        Duration::from_millis(u64::try_from(yield_until - now).unwrap_or(0))
                    }
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
