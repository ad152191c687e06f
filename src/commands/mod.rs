//! CLI command handlers
//!
//! Each handler drives one facade action, renders progress with an
//! `indicatif` bar and prints per-repository outcomes followed by a summary.

pub mod batch;
pub mod docs;
pub mod repos;

pub use batch::{handle_branch_command, handle_commit_command, handle_update_command};
pub use docs::handle_docs_command;
pub use repos::{handle_add_command, handle_list_command, handle_remove_command};

use anyhow::Result;
use indicatif::ProgressBar;
use std::future::Future;
use std::path::Path;

use crate::core::{create_progress_bar, BatchReport};
use crate::utils::{set_terminal_title, set_terminal_title_and_flush, TITLE_DONE, TITLE_RUNNING};

pub(crate) const NO_REPOS_MESSAGE: &str = "No repositories registered. Add one with `fleet add <URL>`.";

/// Runs `action` with a progress bar labelled `prefix`, keeping the terminal
/// title in sync; the bar is cleared before returning
pub(crate) async fn with_progress<T, F, Fut>(prefix: &str, action: F) -> Result<T>
where
    F: FnOnce(ProgressBar) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    set_terminal_title(TITLE_RUNNING);
    let pb = create_progress_bar(prefix)?;
    let result = action(pb.clone()).await;
    pb.finish_and_clear();
    set_terminal_title_and_flush(TITLE_DONE);
    result
}

/// Prints one line per target, then the summary and the attention tree
pub(crate) fn print_batch_report(report: &BatchReport, clone_root: &Path) {
    let width = report
        .outcomes
        .iter()
        .map(|o| o.name.len())
        .max()
        .unwrap_or(0);

    for outcome in &report.outcomes {
        let detail = match outcome.status.reason() {
            Some(reason) => crate::core::clean_error_message(reason),
            None => outcome.message.clone(),
        };
        println!(
            "{} {:width$}  {:10} {}",
            outcome.status.symbol(),
            outcome.name,
            outcome.status.text(),
            detail,
        );
    }

    println!();
    println!("{}", report.generate_summary());
    let details = report.generate_detailed_summary(clone_root);
    if !details.is_empty() {
        println!();
        println!("{details}");
    }
}
