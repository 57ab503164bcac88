//! Small supporting utilities shared across modules.

/// Emit a `trace!`-level log line when the `log` feature is enabled;
/// compiles to nothing otherwise.
macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")] log::trace!($($tt)*)
    };
}

/// Emit a `warn!`-level log line when the `log` feature is enabled.
macro_rules! warn {
    ($($tt:tt)*) => {
        #[cfg(feature = "log")] log::warn!($($tt)*)
    };
}

pub(crate) use trace;
pub(crate) use warn;
