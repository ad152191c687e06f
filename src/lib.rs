//! # repo-fleet
//!
//! `repo-fleet` manages a set of git repositories as one unit. It powers the
//! `fleet` CLI tool.
//!
//! ## Core Features
//!
//! - **Registry**: a JSON file mapping repository names to origin URLs, healed
//!   from whatever working copies already sit in the clone root.
//! - **Batch git operations**: clone, update, branch and commit across every
//!   repository concurrently, one outcome per repository.
//! - **Module staging**: resolve each repository's payload package and mirror
//!   it into a single importable tree for documentation tooling.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use repo_fleet::core::{LogProgress, Settings};
//! use repo_fleet::git::SystemGit;
//! use repo_fleet::Fleet;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load(".")?;
//!     let git = Arc::new(SystemGit::new(settings.git_timeout));
//!     let fleet = Fleet::open(settings, git, 4)?;
//!     let sink = LogProgress { label: "update".into() };
//!     let report = fleet.update_all("main", &sink).await?;
//!     println!("{}", report.generate_summary());
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod error;
pub mod fleet;
pub mod git;
pub mod modules;
pub mod utils;

pub use error::ValidationError;
pub use fleet::{Fleet, RemovalReport};
