use std::path::Path;
use std::process::Command;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::contract::{Vcs, VcsFailure};

/// Version-control implementation that shells out to the `git` binary.
///
/// Every operation runs as `git -C <repo_dir> ...` so the process
/// working directory is never touched.
pub struct GitCli;

fn run_git(repo_dir: &Path, subcommand: &'static str, args: &[&str]) -> Result<(), VcsFailure> {
    debug!(subcommand, ?args, dir = %repo_dir.display(), "Invoking git");

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            debug!(subcommand, "git succeeded");
            Ok(())
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
            error!(
                subcommand,
                status = ?out.status.code(),
                stderr = %stderr,
                "git exited with non-zero code"
            );
            Err(VcsFailure::Exited {
                subcommand,
                status: out.status.code(),
                stderr,
            })
        }
        Err(e) => {
            error!(subcommand, error = ?e, "Failed to launch git process");
            Err(VcsFailure::Spawn {
                subcommand,
                source: e,
            })
        }
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn init(&self, repo_dir: &Path) -> Result<(), VcsFailure> {
        run_git(repo_dir, "init", &["init"])
    }

    async fn add_all(&self, repo_dir: &Path) -> Result<(), VcsFailure> {
        run_git(repo_dir, "add", &["add", "-A"])
    }

    async fn commit(&self, repo_dir: &Path, message: &str) -> Result<(), VcsFailure> {
        run_git(repo_dir, "commit", &["commit", "-m", message])
    }

    async fn checkout_branch(&self, repo_dir: &Path, branch: &str) -> Result<(), VcsFailure> {
        // -B creates the branch, or resets it if it already exists.
        run_git(repo_dir, "checkout", &["checkout", "-B", branch])
    }

    async fn force_push(
        &self,
        repo_dir: &Path,
        remote_url: &str,
        branch: &str,
    ) -> Result<(), VcsFailure> {
        info!(remote_url, branch, "Force-pushing publishing branch");
        run_git(repo_dir, "push", &["push", "-f", remote_url, branch])
    }
}
