pub mod builder;
pub mod config;
pub mod contract;
pub mod load_config;
pub mod publish;
pub mod staging;
pub mod vcs;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use builder::ShellBuilder;
use load_config::{load_config, Overrides};
use publish::publish;
use vcs::GitCli;

/// CLI for docpub: build documentation and force-push it to a hosting branch.
#[derive(Parser)]
#[clap(
    name = "docpub",
    version,
    about = "Build documentation and publish it to a hosting branch of a git remote"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the documentation and publish it to the configured branch
    Publish {
        /// Path to the YAML config file (docpub.yml is used if present)
        #[clap(long)]
        config: Option<PathBuf>,
        /// Project name the redirect document points at
        #[clap(long)]
        project_name: Option<String>,
        /// Remote URL the publishing branch is pushed to
        #[clap(long)]
        remote_url: Option<String>,
        /// Name of the publishing branch
        #[clap(long)]
        branch: Option<String>,
        /// Shell command that generates the documentation
        #[clap(long)]
        build_command: Option<String>,
        /// Directory the build command leaves its output in
        #[clap(long)]
        output_dir: Option<PathBuf>,
        /// Directory the build runs in and the staging area is created under
        #[clap(long)]
        working_dir: Option<PathBuf>,
    },
}

/// Extracted CLI logic entrypoint shared by main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Publish {
            config,
            project_name,
            remote_url,
            branch,
            build_command,
            output_dir,
            working_dir,
        } => {
            let overrides = Overrides {
                project_name,
                remote_url,
                branch_name: branch,
                build_command,
                output_dir,
                working_dir,
            };
            let config = load_config(config.as_deref(), overrides)?;
            config.trace_loaded();

            let builder = ShellBuilder::new(&config.build_command, &config.working_dir);
            let vcs = GitCli;

            println!("Publishing documentation...");
            let report = publish(&config, &builder, &vcs).await?;
            println!("Publish complete.\nReport:");
            println!("{:#?}", report);
            Ok(())
        }
    }
}
