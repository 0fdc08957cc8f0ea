//! Conditional logging macros that check a module-level `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```rust,ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! use crate::{log_debug, log_worker};
//!
//! log_debug!("tracked {} players", 12);
//! log_worker!(info, "online-tracker", "tracked {} players", 12);
//! ```

/// Warn-level log line, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Debug-level counterpart of [`log_warn!`].
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Log line tagged with a periodic task name, e.g. `[online-tracker] tracked 12 players`.
///
/// The first argument picks the `log` level macro. Not gated by `ENABLE_LOGS`.
/// Arguments must be positional: the format string is assembled with `concat!`.
#[macro_export]
macro_rules! log_worker {
    ($level:ident, $task:expr, $fmt:literal $($arg:tt)*) => {
        log::$level!(concat!("[{}] ", $fmt), $task $($arg)*)
    };
}
