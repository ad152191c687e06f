//! fleet: manage a set of git repositories as one unit

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use repo_fleet::commands;
use repo_fleet::core::{get_git_concurrency, resolve_workspace_root, Settings};
use repo_fleet::git::SystemGit;
use repo_fleet::utils::init_logging;
use repo_fleet::Fleet;

#[derive(Parser)]
#[command(name = "fleet", version, about = "Batch git operations and module staging across many repositories")]
struct Cli {
    /// Workspace directory holding the registry, clones and staging tree
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Number of repositories processed concurrently
    #[arg(long, short = 'j', global = true)]
    jobs: Option<usize>,

    /// Process one repository at a time
    #[arg(long, global = true)]
    sequential: bool,

    /// Show info-level logs on the console
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a repository by URL and clone it
    Add { url: String },
    /// Forget a repository and delete its working copy and staged module
    Remove { name: String },
    /// List registered repositories
    List,
    /// Checkout a branch and pull in every repository
    Update {
        #[arg(long)]
        branch: String,
    },
    /// Create a branch from a base branch in every repository (idempotent)
    Branch {
        #[arg(long = "new")]
        new_branch: String,
        #[arg(long = "base")]
        base_branch: String,
    },
    /// Commit all changes on a branch and push, in every repository
    Commit {
        #[arg(long)]
        branch: String,
        #[arg(long, short = 'm')]
        message: String,
    },
    /// Stage module payloads into the local modules tree for a docs build
    Docs {
        /// Repositories to stage; all registered ones when omitted
        names: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace = resolve_workspace_root(cli.workspace)?;
    let settings = Settings::load(&workspace)?;
    if let Some(log_path) = init_logging(&settings.log_dir, cli.verbose) {
        tracing::debug!(path = %log_path.display(), "Logging to file");
    }

    let concurrency = get_git_concurrency(cli.jobs, cli.sequential, settings.jobs);
    let git = Arc::new(SystemGit::new(settings.git_timeout));
    let fleet = Fleet::open(settings, git, concurrency)?;

    match cli.command {
        Commands::Add { url } => commands::handle_add_command(&fleet, &url).await,
        Commands::Remove { name } => commands::handle_remove_command(&fleet, &name),
        Commands::List => commands::handle_list_command(&fleet),
        Commands::Update { branch } => commands::handle_update_command(&fleet, &branch).await,
        Commands::Branch {
            new_branch,
            base_branch,
        } => commands::handle_branch_command(&fleet, &new_branch, &base_branch).await,
        Commands::Commit { branch, message } => {
            commands::handle_commit_command(&fleet, &branch, &message).await
        }
        Commands::Docs { names } => commands::handle_docs_command(&fleet, &names).await,
    }
}
