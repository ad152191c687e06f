//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{RemoteBuilder, TestRemote, Workspace};
pub use self::git::{configure_user, create_test_commit, git_stdout, is_git_available, setup_git_repo};
