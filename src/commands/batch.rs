//! Batch git commands: update, branch, commit

use anyhow::Result;

use super::{print_batch_report, with_progress, NO_REPOS_MESSAGE};
use crate::core::{BatchReport, ProgressSink};
use crate::fleet::Fleet;

fn render(fleet: &Fleet, report: &BatchReport) {
    if report.total() == 0 {
        println!("{NO_REPOS_MESSAGE}");
        return;
    }
    print_batch_report(report, &fleet.settings().clone_root);
}

/// Checks out `branch` and pulls in every repository
pub async fn handle_update_command(fleet: &Fleet, branch: &str) -> Result<()> {
    let report = with_progress("update", |pb| async move {
        fleet.update_all(branch, &pb as &dyn ProgressSink).await
    })
    .await?;
    render(fleet, &report);
    Ok(())
}

/// Ensures `new_branch` exists in every repository
pub async fn handle_branch_command(fleet: &Fleet, new_branch: &str, base_branch: &str) -> Result<()> {
    let report = with_progress("branch", |pb| async move {
        fleet
            .branch_all(new_branch, base_branch, &pb as &dyn ProgressSink)
            .await
    })
    .await?;
    render(fleet, &report);
    Ok(())
}

/// Commits and pushes pending changes on `branch` in every repository
pub async fn handle_commit_command(fleet: &Fleet, branch: &str, message: &str) -> Result<()> {
    let report = with_progress("commit", |pb| async move {
        fleet
            .commit_all(branch, message, &pb as &dyn ProgressSink)
            .await
    })
    .await?;
    render(fleet, &report);
    Ok(())
}
