//! Git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Runs git in `path` and returns trimmed stdout, failing on non-zero exit
pub fn git_stdout(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(path).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Sets the commit identity and disables signing for one repository
pub fn configure_user(path: &Path) -> Result<()> {
    git_stdout(path, &["config", "user.name", "Test User"])?;
    git_stdout(path, &["config", "user.email", "test@example.com"])?;
    git_stdout(path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Initializes a repository whose first branch is `main`, with user config
pub fn setup_git_repo(path: &Path) -> Result<()> {
    git_stdout(path, &["init", "--quiet"])?;
    git_stdout(path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    configure_user(path)
}

/// Writes a file, stages it and commits
pub fn create_test_commit(path: &Path, file_name: &str, content: &str, message: &str) -> Result<()> {
    let file_path = path.join(file_name);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file_path, content)?;
    git_stdout(path, &["add", file_name])?;
    git_stdout(path, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
