//! Terminal color support for CLI output.
//!
//! Provides colorful output when running interactively, with automatic
//! detection to disable colors when output is piped or redirected.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Check if stdout is a terminal (interactive mode).
pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal()
}

/// Check if stderr is a terminal (interactive mode).
pub fn is_stderr_interactive() -> bool {
    std::io::stderr().is_terminal()
}

/// Style for error messages.
pub fn error(msg: &str) -> String {
    if is_stderr_interactive() {
        format!("{} {}", "error:".red().bold(), msg)
    } else {
        format!("error: {}", msg)
    }
}

/// Style for success messages.
pub fn success(msg: &str) -> String {
    if is_interactive() {
        format!("{}", msg.green())
    } else {
        msg.to_string()
    }
}

/// Style for dim/secondary text.
pub fn dim(msg: &str) -> String {
    if is_interactive() {
        format!("{}", msg.dimmed())
    } else {
        msg.to_string()
    }
}

/// Style for header text (bold + color).
pub fn header(msg: &str) -> String {
    if is_interactive() {
        format!("{}", msg.bold().blue())
    } else {
        msg.to_string()
    }
}

/// Style for file paths.
pub fn path(msg: &str) -> String {
    if is_interactive() {
        format!("{}", msg.underline())
    } else {
        msg.to_string()
    }
}

/// Style for numeric values (like device ids).
pub fn number(msg: &str) -> String {
    if is_interactive() {
        format!("{}", msg.cyan())
    } else {
        msg.to_string()
    }
}

/// Marker for the device configured for recording in listings.
pub fn configured_marker(configured: bool) -> String {
    if !configured {
        return " ".to_string();
    }
    if is_interactive() {
        format!("{}", "*".green().bold())
    } else {
        "*".to_string()
    }
}

/// Format a monitor peak level with a color cue: dim when silent, green
/// when healthy, red when at or near clipping.
pub fn peak_level(peak: f32) -> String {
    let text = format!("{:.3}", peak);
    if !is_interactive() {
        return text;
    }

    if peak >= 0.99 {
        format!("{}", text.red().bold())
    } else if peak >= 0.01 {
        format!("{}", text.green())
    } else {
        format!("{}", text.dimmed())
    }
}
