//! Logging macros that compile away without the `tracing` feature.
//!
//! With the feature on these are the `tracing` macros. Without it the
//! arguments are still type-checked, inside a branch that never runs, so
//! values only used for logging do not trigger unused warnings.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __varitex_discard {
    ($($arg:tt)*) => {
        if false {
            let _ = ::std::format_args!($($arg)*);
        }
    };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::__varitex_discard!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::__varitex_discard!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__varitex_discard!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, trace, warn};
