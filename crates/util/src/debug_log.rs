//! Contains tools for debug-mode logging.
//!
//! Logging cannot be enabled when `cfg!(debug_assertions)` is false, otherwise
//! it's enabled by default. Info goes to stdout, warnings and errors go to
//! stderr.

pub mod panic_on_errors;

use std::panic::Location;
#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicBool, Ordering};

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// The severity of a debug log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// The label printed in the log line's header.
    pub const fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }

    /// The ANSI color code used for the label when printing to a terminal.
    pub const fn color(self) -> &'static str {
        match self {
            Level::Info => "\x1b[35m",
            Level::Warning => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

/// Shared implementation of the `debug_log_*` macros. Don't use this directly.
#[doc(hidden)]
#[macro_export]
macro_rules! __debug_log {
    ($level:expr, $print:ident, $stream:ident, $($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        if $crate::debug_log::enabled() {
            let level: $crate::debug_log::Level = $level;
            let is_terminal = ::std::io::IsTerminal::is_terminal(&::std::io::$stream());
            let (blue, color, reset_color) = if is_terminal {
                ("\x1b[34m", level.color(), "\x1b[0m")
            } else {
                ("", "", "")
            };

            let where_and_when = $crate::debug_log::where_and_when(blue, reset_color);

            ::std::$print!(
                "{blue}DEBUG LOG{reset_color} [{color}{}{reset_color}]: {}\n{where_and_when}",
                level.label(),
                format!($($arg)*),
            );
        }
    }};
}

/// Log some info to stdout if both `cfg!(debug_assertions)` and [enabled] are
/// true.
#[macro_export]
macro_rules! debug_log_info {
    ($($arg:tt)*) => {
        $crate::__debug_log!($crate::debug_log::Level::Info, println, stdout, $($arg)*)
    };
}

/// Log a warning to stderr if both `cfg!(debug_assertions)` and [enabled] are
/// true.
#[macro_export]
macro_rules! debug_log_warning {
    ($($arg:tt)*) => {
        $crate::__debug_log!($crate::debug_log::Level::Warning, eprintln, stderr, $($arg)*)
    };
}

/// Log an error to stderr if both `cfg!(debug_assertions)` and [enabled] are
/// true. Panics afterwards if [panic_on_errors::enabled] is also true.
#[macro_export]
macro_rules! debug_log_error {
    ($($arg:tt)*) => {{
        $crate::__debug_log!($crate::debug_log::Level::Error, eprintln, stderr, $($arg)*);

        #[cfg(debug_assertions)]
        if $crate::debug_log::enabled() && $crate::debug_log::panic_on_errors::enabled() {
            panic!("Panicking on error logging enabled.");
        }
    }};
}

/// Whether logging is enabled or not.
///
/// Logging cannot be enabled when `cfg!(debug_assertions)` is false, otherwise
/// it's enabled by default.
#[inline(always)]
pub fn enabled() -> bool {
    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn enabled_impl() -> bool {
        false
    }

    #[cfg(debug_assertions)]
    #[inline(always)]
    fn enabled_impl() -> bool {
        ENABLED.load(Ordering::Relaxed)
    }

    enabled_impl()
}

/// Disable logging.
#[inline(always)]
pub fn disable() {
    #[cfg(debug_assertions)]
    ENABLED.store(false, Ordering::Relaxed);
}

/// Enable logging.
///
/// Trying to enable logging when `cfg!(debug_assertions)` is false will result
/// in the program panicking.
#[inline(always)]
pub fn enable() {
    #[cfg(not(debug_assertions))]
    panic!("Debug logging cannot be enabled.");

    #[cfg(debug_assertions)]
    ENABLED.store(true, Ordering::Relaxed);
}

/// The location of the caller and the time this was called, as a string.
///
/// This function gets called by the debug log macros (e.g. [debug_log_info])
/// and generally shouldn't be called directly.
#[track_caller]
pub fn where_and_when(color: &str, reset_color: &str) -> String {
    let loc = Location::caller();
    let where_ = format!("{}:{}:{}", loc.file(), loc.line(), loc.column());

    let when = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|e| format!("Unknown time: {e}"));

    format!("\tWhere: {color}{where_}{reset_color}\n\tTime:  {color}{when}{reset_color}")
}

#[cfg(debug_assertions)]
static ENABLED: AtomicBool = AtomicBool::new(true);
