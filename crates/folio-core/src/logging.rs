#![forbid(unsafe_code)]

//! Logging macros that compile to nothing unless the `tracing` feature is on.
//!
//! Controllers log through `folio_core::debug!` / `folio_core::warn!` /
//! `folio_core::trace!` so that downstream crates do not need their own
//! `tracing` dependency for plain event emission. Event names follow a
//! dotted `component.action` convention (`reveal.fire`, `rotator.tick`).

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing as __tracing;

#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::logging::__tracing::trace!($($arg)*) };
}

#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::logging::__tracing::debug!($($arg)*) };
}

#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::logging::__tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Environment variable holding the `EnvFilter` directive for [`init_json`].
pub const LOG_ENV: &str = "FOLIO_LOG";

/// Install a global JSON subscriber filtered by `FOLIO_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
