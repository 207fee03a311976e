//! Logging facilities.
//!
//! The macros prefix each message with the simulation time, the level and the name of the component,
//! so that logs of the simulation read as a timeline.

use atty::Stream;
use colored::{Color, ColoredString, Colorize};

/// Applies the color to the string if stderr (log) goes to console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

/// Logs a message at the info level.
///
/// The first two arguments are the simulation time and the component name.
#[macro_export]
macro_rules! log_info {
    ($time:expr, $name:expr, $format:expr $(, $arg:expr)* $(,)?) => (
        log::info!(
            target: "simulation",
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name $(, $arg)*
        )
    );
}

/// Logs a message at the warn level.
#[macro_export]
macro_rules! log_warn {
    ($time:expr, $name:expr, $format:expr $(, $arg:expr)* $(,)?) => (
        log::warn!(
            target: "simulation",
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("WARN", $crate::colored::Color::Yellow), $name $(, $arg)*
        )
    );
}

/// Logs a message at the debug level.
#[macro_export]
macro_rules! log_debug {
    ($time:expr, $name:expr, $format:expr $(, $arg:expr)* $(,)?) => (
        log::debug!(
            target: "simulation",
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name $(, $arg)*
        )
    );
}

/// Logs a message at the trace level.
#[macro_export]
macro_rules! log_trace {
    ($time:expr, $name:expr, $format:expr $(, $arg:expr)* $(,)?) => (
        log::trace!(
            target: "simulation",
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name $(, $arg)*
        )
    );
}
