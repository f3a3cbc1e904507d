//! # contract: interfaces for the external tools the publisher drives
//!
//! The publisher orchestrates two collaborators it never implements
//! itself: the documentation generator and the version-control tool.
//! This module defines one narrow trait per collaborator so the real
//! subprocess-backed implementations can be swapped for deterministic
//! mocks in tests.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so consumers can generate
//!   mocks for unit/integration tests (exported under the
//!   `test-export-mocks` feature).
//!
//! ## Adding New Implementations
//! - Implement the trait for your tool. Convert every meaningful tool
//!   failure into the failure type, carrying the tool's own diagnostic
//!   text so callers can surface it verbatim.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Failure of the documentation generator collaborator.
#[derive(Debug)]
pub enum BuildFailure {
    /// The generator process could not be launched at all.
    Spawn(std::io::Error),
    /// The generator ran but exited non-zero; stderr is carried verbatim.
    Exited {
        status: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildFailure::Spawn(e) => write!(f, "failed to launch build command: {e}"),
            BuildFailure::Exited { status, stderr } => {
                match status {
                    Some(code) => write!(f, "build command exited with code {code}")?,
                    None => write!(f, "build command terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for BuildFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildFailure::Spawn(e) => Some(e),
            BuildFailure::Exited { .. } => None,
        }
    }
}

/// Failure of a single version-control invocation.
///
/// `subcommand` identifies which operation failed (`init`, `add`,
/// `commit`, `checkout`, `push`) for diagnostics.
#[derive(Debug)]
pub enum VcsFailure {
    Spawn {
        subcommand: &'static str,
        source: std::io::Error,
    },
    Exited {
        subcommand: &'static str,
        status: Option<i32>,
        stderr: String,
    },
}

impl VcsFailure {
    pub fn subcommand(&self) -> &'static str {
        match self {
            VcsFailure::Spawn { subcommand, .. } => subcommand,
            VcsFailure::Exited { subcommand, .. } => subcommand,
        }
    }
}

impl fmt::Display for VcsFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsFailure::Spawn { subcommand, source } => {
                write!(f, "failed to launch git {subcommand}: {source}")
            }
            VcsFailure::Exited {
                subcommand,
                status,
                stderr,
            } => {
                match status {
                    Some(code) => write!(f, "git {subcommand} exited with code {code}")?,
                    None => write!(f, "git {subcommand} terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for VcsFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VcsFailure::Spawn { source, .. } => Some(source),
            VcsFailure::Exited { .. } => None,
        }
    }
}

/// Trait for invoking the external documentation generator.
/// Implemented by the real shell-backed builder and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocBuilder: Send + Sync {
    /// Run the configured build command to completion, producing the
    /// output tree at its known path. Non-zero exit is a failure.
    async fn build(&self) -> Result<(), BuildFailure>;
}

/// Trait for the version-control operations the publish pipeline needs.
/// Each call maps to one invocation of the underlying tool; failures
/// carry the tool's stderr so it can be surfaced verbatim.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Initialize a fresh, empty repository in `repo_dir`.
    async fn init(&self, repo_dir: &Path) -> Result<(), VcsFailure>;

    /// Stage every file under `repo_dir`, untracked files included.
    async fn add_all(&self, repo_dir: &Path) -> Result<(), VcsFailure>;

    /// Commit the staged files with the given message.
    async fn commit(&self, repo_dir: &Path, message: &str) -> Result<(), VcsFailure>;

    /// Create `branch` at the current commit, or reset it there if it
    /// already exists.
    async fn checkout_branch(&self, repo_dir: &Path, branch: &str) -> Result<(), VcsFailure>;

    /// Force-push `branch` to `remote_url`, overwriting the remote
    /// branch unconditionally.
    async fn force_push(
        &self,
        repo_dir: &Path,
        remote_url: &str,
        branch: &str,
    ) -> Result<(), VcsFailure>;
}
