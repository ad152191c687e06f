// Internal modules - reached through the curated API below
pub mod config;
pub(crate) mod progress;
pub(crate) mod registry;
pub(crate) mod stats;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
