//! Documentation build preparation command

use anyhow::Result;

use super::with_progress;
use crate::core::ProgressSink;
use crate::fleet::Fleet;

/// Stages the payload of the named repositories (all when empty) and resets
/// the docs scaffold
pub async fn handle_docs_command(fleet: &Fleet, names: &[String]) -> Result<()> {
    let selection = if names.is_empty() { None } else { Some(names) };
    let report = with_progress("stage", |pb| async move {
        fleet.prepare_doc_build(selection, &pb as &dyn ProgressSink)
    })
    .await?;

    let width = report
        .outcomes
        .iter()
        .map(|o| o.repository.len())
        .max()
        .unwrap_or(0);
    for outcome in &report.outcomes {
        let detail = match &outcome.status {
            crate::modules::StageStatus::Staged { payload, files } => {
                format!("{files} files from {}", crate::utils::shorten_path(payload, 40))
            }
            crate::modules::StageStatus::NoPayload(reason)
            | crate::modules::StageStatus::Failed(reason) => reason.clone(),
        };
        println!("{} {:width$}  {}", outcome.status.symbol(), outcome.repository, detail);
    }

    println!();
    println!("{}", report.generate_summary());
    println!(
        "📁 Staged modules in {}, docs scaffold in {}",
        report.staging_root.display(),
        fleet.settings().docs_root.display()
    );
    Ok(())
}
