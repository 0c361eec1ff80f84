//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! The polling paths log every cycle, which is useful when debugging one
//! module and noise otherwise. Each module that uses these macros defines
//! its own `const ENABLE_LOGS: bool` and the macros (exported at the crate
//! root) check it at the call site.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
