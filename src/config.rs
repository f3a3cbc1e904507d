use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Name of the ephemeral staging directory created under `working_dir`.
pub const STAGING_DIR_NAME: &str = ".docpub-staging";

/// Fully resolved configuration for one publish run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Project name, interpolated into the redirect document's target
    /// path (`./<project_name>/index.html`).
    pub project_name: String,
    /// Remote the publishing branch is force-pushed to.
    pub remote_url: String,
    /// Name of the publishing branch.
    pub branch_name: String,
    /// Shell command that generates the documentation.
    pub build_command: String,
    /// Directory the build command leaves its output in, relative to
    /// `working_dir` unless absolute.
    pub output_dir: PathBuf,
    /// Explicit working directory: the build command runs here and the
    /// staging directory is created here. Replaces any implicit reliance
    /// on the process working directory.
    pub working_dir: PathBuf,
}

impl PublishConfig {
    /// Path of the staging directory for this run.
    pub fn staging_dir(&self) -> PathBuf {
        self.working_dir.join(STAGING_DIR_NAME)
    }

    /// Path the generator's output tree is read from.
    pub fn output_tree(&self) -> PathBuf {
        self.working_dir.join(&self.output_dir)
    }

    pub fn trace_loaded(&self) {
        info!(
            project_name = %self.project_name,
            remote_url = %self.remote_url,
            branch_name = %self.branch_name,
            build_command = %self.build_command,
            output_dir = %self.output_dir.display(),
            working_dir = %self.working_dir.display(),
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}
