//! Registry commands: add, remove, list

use anyhow::Result;

use super::{print_batch_report, with_progress, NO_REPOS_MESSAGE};
use crate::core::ProgressSink;
use crate::fleet::Fleet;

/// Registers and clones one repository
pub async fn handle_add_command(fleet: &Fleet, url: &str) -> Result<()> {
    let (name, report) = with_progress("clone", |pb| async move {
        fleet.add_repository(url, &pb as &dyn ProgressSink).await
    })
    .await?;

    println!("📦 Registered {name}");
    print_batch_report(&report, &fleet.settings().clone_root);
    Ok(())
}

/// Forgets a repository and deletes its local copies
pub fn handle_remove_command(fleet: &Fleet, name: &str) -> Result<()> {
    let removal = fleet.remove_repository(name)?;

    println!("🗑️  Removed {} from the registry", removal.name);
    let mark = |done: bool| if done { "deleted" } else { "not present" };
    println!("   ├─ working copy   {}", mark(removal.clone_removed));
    println!("   └─ staged module  {}", mark(removal.staged_removed));
    Ok(())
}

/// Prints every registered repository with its origin
pub fn handle_list_command(fleet: &Fleet) -> Result<()> {
    let records = fleet.repositories()?;
    if records.is_empty() {
        println!("{NO_REPOS_MESSAGE}");
        return Ok(());
    }

    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
    println!("📚 {} registered repositories", records.len());
    for (i, record) in records.iter().enumerate() {
        let tree_char = if i == records.len() - 1 { "└─" } else { "├─" };
        println!("   {tree_char} {:width$}  {}", record.name, record.origin);
    }
    Ok(())
}
