mod mint;
#[cfg(any(feature = "async-tokio", feature = "async-smol"))]
mod runtime;
mod sleep_provider;

#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
pub use mint::*;
#[cfg_attr(docsrs, doc(cfg(any(feature = "async-tokio", feature = "async-smol"))))]
#[cfg(any(feature = "async-tokio", feature = "async-smol"))]
pub use runtime::*;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
pub use sleep_provider::*;
