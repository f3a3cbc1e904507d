use std::path::PathBuf;
use std::process::Command;

use async_trait::async_trait;
use tracing::{error, info};

use crate::contract::{BuildFailure, DocBuilder};

/// Runs the configured build command through `sh -c` in the working
/// directory, capturing its output so failures can be surfaced verbatim.
pub struct ShellBuilder {
    command: String,
    working_dir: PathBuf,
}

impl ShellBuilder {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl DocBuilder for ShellBuilder {
    async fn build(&self) -> Result<(), BuildFailure> {
        info!(
            command = %self.command,
            dir = %self.working_dir.display(),
            "Running documentation build"
        );

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.working_dir)
            .output();

        match output {
            Ok(out) if out.status.success() => {
                info!(command = %self.command, "Documentation build succeeded");
                Ok(())
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
                error!(
                    command = %self.command,
                    status = ?out.status.code(),
                    stderr = %stderr,
                    "Build command exited with non-zero code"
                );
                Err(BuildFailure::Exited {
                    status: out.status.code(),
                    stderr,
                })
            }
            Err(e) => {
                error!(command = %self.command, error = ?e, "Failed to launch build command");
                Err(BuildFailure::Spawn(e))
            }
        }
    }
}

