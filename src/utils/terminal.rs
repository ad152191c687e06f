//! Terminal title updates

use std::io::Write;

pub const TITLE_RUNNING: &str = "🚀 fleet";
pub const TITLE_DONE: &str = "✅ fleet";

/// Sets the terminal title to the specified text
pub fn set_terminal_title(title: &str) {
    // OSC 0: set icon name and window title
    print!("\x1b]0;{title}\x07");
}

/// Sets the terminal title and flushes stdout so it shows immediately
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!("Failed to flush terminal title: {e}");
    }
}
