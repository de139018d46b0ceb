mod config;
mod output;
mod preview;
mod provider;

use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use preview::{Orchestrator, PreviewRequest};
use provider::lightsail::LightsailProvider;

/// manage-preview: provisions and tears down ephemeral per-PR preview
/// environments on AWS Lightsail, invoked from a CI pipeline.
#[derive(Parser, Debug)]
#[command(name = "manage-preview", version, about)]
struct Cli {
    /// Action to perform
    #[arg(value_enum)]
    action: Action,

    /// Pull request number
    #[arg(long)]
    pr_number: u64,

    /// Repository name (owner/repo)
    #[arg(long)]
    repo_name: String,

    /// Branch name (required for create)
    #[arg(long)]
    branch: Option<String>,

    /// Commit SHA (required for create)
    #[arg(long)]
    commit_sha: Option<String>,

    /// AWS region (overrides the config file, default us-east-1)
    #[arg(long)]
    region: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Action {
    /// Create or update the preview environment for a pull request
    Create,
    /// Tear down the preview environment for a pull request
    Delete,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Usage errors must surface before any network call.
    let create_args = match cli.action {
        Action::Create => match (&cli.branch, &cli.commit_sha) {
            (Some(branch), Some(commit_sha)) => Some((branch.clone(), commit_sha.clone())),
            _ => {
                return Err("--branch and --commit-sha are required for the create action".into())
            }
        },
        Action::Delete => None,
    };

    info!("loading configuration");
    let mut config = config::Config::load()?;
    if let Some(region) = cli.region {
        config.provider.region = region;
    }
    debug!(region = %config.provider.region, "resolved provider region");

    let provider = LightsailProvider::new(config.provider.region.clone()).await;
    let orchestrator = Orchestrator::new(provider, config);

    match create_args {
        Some((branch, commit_sha)) => {
            let request = PreviewRequest {
                pr_number: cli.pr_number,
                repo_name: cli.repo_name,
                branch,
                commit_sha,
            };
            let summary = orchestrator.create_preview(&request).await?;
            output::print_summary(&summary);
            output::emit_ci_outputs(&summary)?;
        }
        None => {
            let name = orchestrator.delete_preview(cli.pr_number, &cli.repo_name).await?;
            output::print_teardown(&name);
        }
    }

    Ok(())
}
