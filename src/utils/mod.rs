pub(crate) mod fs;
pub mod logging;
pub(crate) mod terminal;

// Public API - utilities used by commands
pub use fs::shorten_path;
pub use logging::{init_logging, log_file_name};
pub use terminal::{set_terminal_title, set_terminal_title_and_flush, TITLE_DONE, TITLE_RUNNING};
