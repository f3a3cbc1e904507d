use crate::config::PublishConfig;
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// File consulted when no `--config` flag is given.
pub const DEFAULT_CONFIG_FILE: &str = "docpub.yml";

const DEFAULT_BRANCH_NAME: &str = "gh-pages";
const DEFAULT_BUILD_COMMAND: &str = "cargo doc";
const DEFAULT_OUTPUT_DIR: &str = "target/doc";

/// The on-disk YAML shape: every field optional, merged with CLI
/// overrides and defaults into a [`PublishConfig`].
#[derive(Deserialize, Default)]
struct FileConfig {
    project_name: Option<String>,
    remote_url: Option<String>,
    branch_name: Option<String>,
    build_command: Option<String>,
    output_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
}

/// Values supplied on the command line; each one beats the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub project_name: Option<String>,
    pub remote_url: Option<String>,
    pub branch_name: Option<String>,
    pub build_command: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

/// Loads the YAML config file (if any) and merges CLI overrides on top.
///
/// With an explicit `path` the file must exist and parse. With `None`,
/// `docpub.yml` is read if present and silently skipped otherwise, so a
/// fully flag-driven invocation needs no file at all. `project_name` and
/// `remote_url` are required from one source or the other.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<PublishConfig> {
    let file_conf = match path {
        Some(path) => {
            info!(config_path = ?path, "Loading configuration from file");
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    error!(error = ?e, config_path = ?path, "Failed to read config file");
                    return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path, e));
                }
            };
            parse_file(path, &content)?
        }
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(default) {
                Ok(content) => {
                    info!(config_path = ?default, "Loaded default config file");
                    parse_file(default, &content)?
                }
                Err(_) => {
                    info!("No config file given and no docpub.yml present, using flags only");
                    FileConfig::default()
                }
            }
        }
    };

    let project_name = match overrides.project_name.or(file_conf.project_name) {
        Some(name) => name,
        None => {
            error!("project_name missing from both config file and flags");
            anyhow::bail!("project_name is required (config file or --project-name)");
        }
    };
    let remote_url = match overrides.remote_url.or(file_conf.remote_url) {
        Some(url) => url,
        None => {
            error!("remote_url missing from both config file and flags");
            anyhow::bail!("remote_url is required (config file or --remote-url)");
        }
    };

    let config = PublishConfig {
        project_name,
        remote_url,
        branch_name: overrides
            .branch_name
            .or(file_conf.branch_name)
            .unwrap_or_else(|| DEFAULT_BRANCH_NAME.to_string()),
        build_command: overrides
            .build_command
            .or(file_conf.build_command)
            .unwrap_or_else(|| DEFAULT_BUILD_COMMAND.to_string()),
        output_dir: overrides
            .output_dir
            .or(file_conf.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        working_dir: overrides
            .working_dir
            .or(file_conf.working_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    info!(
        project_name = %config.project_name,
        branch_name = %config.branch_name,
        "Config loaded and merged successfully"
    );

    Ok(config)
}

fn parse_file(path: &Path, content: &str) -> Result<FileConfig> {
    match serde_yaml::from_str(content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
