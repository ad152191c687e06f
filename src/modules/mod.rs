//! Module resolution and staging copy engine

pub mod mirror;
pub mod resolver;
pub mod sanitize;
pub mod stage;

pub use mirror::{mirror_dir, MirrorStats};
pub use resolver::{payload_candidates, resolve_payload, Resolution, ResolvedModule};
pub use sanitize::remove_named_files;
pub use stage::{stage_modules, StageOutcome, StageReport, StageStatus};
