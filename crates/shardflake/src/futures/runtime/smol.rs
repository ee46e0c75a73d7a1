use core::future::Future;

use smol::Timer;

use crate::{
    IdGenerator, Result, ShardflakeId, TimeSource,
    futures::{IdGeneratorAsyncExt, SleepProvider},
};

/// An implementation of [`SleepProvider`] using Smol's timer.
///
/// This is the default provider for use in async applications built on Smol.
pub struct SmolSleep;
impl SleepProvider for SmolSleep {
    async fn sleep_for(dur: core::time::Duration) {
        Timer::after(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Smol's yield.
///
/// This strategy avoids timer-based delays by yielding to the scheduler
/// immediately. It polls more tightly than [`SmolSleep`] and burns more CPU
/// under contention.
pub struct SmolYield;
impl SleepProvider for SmolYield {
    async fn sleep_for(_dur: core::time::Duration) {
        smol::future::yield_now().await;
    }
}

/// Extension trait for minting IDs on the [`smol`](https://docs.rs/smol)
/// runtime, using [`SmolSleep`] as the sleep provider.
pub trait IdGeneratorAsyncSmolExt {
    /// Returns a future that resolves to the next available ID.
    ///
    /// # Errors
    ///
    /// Fails with the same errors as [`IdGenerator::poll_mint`].
    fn mint_async(&self) -> impl Future<Output = Result<ShardflakeId>> + Send;
}

impl<T> IdGeneratorAsyncSmolExt for IdGenerator<T>
where
    T: TimeSource + Sync,
{
    fn mint_async(&self) -> impl Future<Output = Result<ShardflakeId>> + Send {
        <Self as IdGeneratorAsyncExt>::try_mint_async::<SmolSleep>(self)
    }
}
