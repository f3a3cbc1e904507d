use clap::Parser;

use docpub::publish::PublishError;
use docpub::{run, Cli};

/// Exit codes are distinct per failure stage so scripts can tell a
/// build failure apart from a push failure. Config and usage errors
/// exit 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PublishError>() {
        Some(PublishError::Build(_)) => 2,
        Some(PublishError::Staging(_)) => 3,
        Some(PublishError::RepoInit(_)) => 4,
        Some(PublishError::Copy(_)) => 5,
        Some(PublishError::Push(_)) => 6,
        None => 1,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("[ERROR] Publish failed: {e:#}");
            std::process::exit(exit_code(&e));
        }
    }
}
