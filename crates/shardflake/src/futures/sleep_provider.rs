use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// This allows the async mint loop to be generic over runtimes like `Tokio` or
/// `Smol`.
pub trait SleepProvider {
    /// We require `Send` so that the future can be safely moved across threads
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
