//! The publish pipeline: build, stage, copy, commit, force-push, with
//! guaranteed staging cleanup on every exit path.

use std::fmt;

use tracing::{error, info};

use crate::config::PublishConfig;
use crate::contract::{BuildFailure, DocBuilder, Vcs, VcsFailure};
use crate::staging::{self, CopyFailure, StagingDir};

/// Fixed commit message used for every published revision.
pub const COMMIT_MESSAGE: &str = "Publish documentation";

/// First failure of the pipeline, one variant per stage. None are
/// retried; cleanup has already run by the time one is returned.
#[derive(Debug)]
pub enum PublishError {
    /// The documentation generator exited non-zero or failed to launch.
    Build(BuildFailure),
    /// The staging directory already existed or could not be created.
    Staging(std::io::Error),
    /// The throwaway repository could not be initialized.
    RepoInit(VcsFailure),
    /// A file of the output tree (or the redirect document) could not be
    /// copied or written.
    Copy(CopyFailure),
    /// Staging, committing, branching or pushing the content failed.
    Push(VcsFailure),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Build(e) => write!(f, "documentation build failed: {e}"),
            PublishError::Staging(e) => write!(f, "staging area setup failed: {e}"),
            PublishError::RepoInit(e) => write!(f, "staging repository init failed: {e}"),
            PublishError::Copy(e) => write!(f, "artifact copy failed: {e}"),
            PublishError::Push(e) => write!(f, "publish failed: {e}"),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Build(e) => Some(e),
            PublishError::Staging(e) => Some(e),
            PublishError::RepoInit(e) => Some(e),
            PublishError::Copy(e) => Some(e),
            PublishError::Push(e) => Some(e),
        }
    }
}

/// Summary of a successful run, printed by the CLI.
#[derive(Debug)]
pub struct PublishReport {
    /// Files committed to the publishing branch, redirect included.
    pub files_published: usize,
    pub branch: String,
    pub remote: String,
    pub commit_message: String,
}

/// Runs the full publish pipeline against the given collaborators.
///
/// Strictly sequential: build, create the staging directory, init the
/// throwaway repository, copy the output tree plus the redirect
/// document, then add/commit/branch/force-push. The first failure
/// aborts the remaining stages. The staging directory is created fresh
/// after a successful build and removed on every exit path from that
/// point on, so a failed run leaves the working directory as it found
/// it and a build failure never creates it at all.
pub async fn publish<B, V>(
    config: &PublishConfig,
    builder: &B,
    vcs: &V,
) -> Result<PublishReport, PublishError>
where
    B: DocBuilder + ?Sized,
    V: Vcs + ?Sized,
{
    info!(
        project_name = %config.project_name,
        remote_url = %config.remote_url,
        branch_name = %config.branch_name,
        "[PUBLISH] Starting documentation publish pipeline"
    );

    // Stage 1: build. Runs before the staging directory exists.
    builder.build().await.map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Build step failed");
        PublishError::Build(e)
    })?;
    info!("[PUBLISH] Build step succeeded");

    // Stage 2: staging area. The guard removes the directory when it
    // goes out of scope, on success and on every early return below.
    let staging = StagingDir::create(&config.staging_dir()).map_err(|e| {
        error!(error = ?e, "[PUBLISH][ERROR] Staging area setup failed");
        PublishError::Staging(e)
    })?;
    let repo_dir = staging.path();

    // Stage 3: fresh repository, decoupled from the project history.
    vcs.init(repo_dir).await.map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Repository init failed");
        PublishError::RepoInit(e)
    })?;

    // Stage 4: copy the output tree, then synthesize the redirect.
    let output_tree = config.output_tree();
    let copied = staging::copy_tree(&output_tree, repo_dir).map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Artifact copy failed");
        PublishError::Copy(e)
    })?;
    let redirect_path = repo_dir.join(staging::REDIRECT_FILE_NAME);
    staging::write_redirect(repo_dir, &config.project_name).map_err(|e| {
        error!(error = ?e, "[PUBLISH][ERROR] Failed to write redirect document");
        PublishError::Copy(CopyFailure {
            path: redirect_path,
            source: e,
        })
    })?;

    // Stage 5: commit and force-push. Not retried; the push either
    // updates the whole branch or leaves the remote untouched.
    vcs.add_all(repo_dir).await.map_err(fail_push)?;
    vcs.commit(repo_dir, COMMIT_MESSAGE).await.map_err(fail_push)?;
    vcs.checkout_branch(repo_dir, &config.branch_name)
        .await
        .map_err(fail_push)?;
    vcs.force_push(repo_dir, &config.remote_url, &config.branch_name)
        .await
        .map_err(fail_push)?;

    info!(
        files = copied + 1,
        branch = %config.branch_name,
        remote = %config.remote_url,
        "[PUBLISH] Published documentation"
    );

    Ok(PublishReport {
        files_published: copied + 1,
        branch: config.branch_name.clone(),
        remote: config.remote_url.clone(),
        commit_message: COMMIT_MESSAGE.to_string(),
    })
}

fn fail_push(e: VcsFailure) -> PublishError {
    error!(subcommand = e.subcommand(), error = %e, "[PUBLISH][ERROR] Publish step failed");
    PublishError::Push(e)
}
