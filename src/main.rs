use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};

use agent_studio_mcp::{
    adapters::{
        inbound::{
            cli::{CliAdapter, tools_command},
            mcp::{AgentStudioServer, serve_stdio},
        },
        outbound::http::HttpStudioBackend,
    },
    application::WorkflowAdapter,
    cli::{Cli, Commands},
    config::{StudioConfig, ensure_env_files_loaded},
    core::ports::WorkflowTools,
    paths::default_log_dir,
};

mod tracing_setup;

fn main() {
    // Environment writes must happen while this is the only thread.
    ensure_env_files_loaded();

    let cli = Cli::parse();
    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| cli.log_file.then(default_log_dir));
    let _guard = tracing_setup::init(cli.verbose, cli.log_json, log_dir.as_deref());

    let outcome = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));
    if let Err(err) = outcome {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command() {
        Commands::Tools(args) => tools_command(&args),
        Commands::Serve => {
            let tools = build_tools(&cli)?;
            serve_stdio(AgentStudioServer::new(tools)).await
        }
        Commands::Invoke(args) => {
            let tools = build_tools(&cli)?;
            CliAdapter::new(tools).invoke_command(&args).await
        }
    }
}

/// Composition root: configuration, HTTP backend, application service.
fn build_tools(cli: &Cli) -> Result<Arc<dyn WorkflowTools>> {
    let config = StudioConfig::resolve(&cli.backend.overrides())?;
    let missing = config.missing_fields();
    if !missing.is_empty() {
        warn!(
            missing = %missing.join(", "),
            "Agent Studio settings are empty; backend calls will fail"
        );
    }
    tracing::debug!(?config, "resolved Agent Studio configuration");

    let backend = HttpStudioBackend::new(&config)?;
    Ok(Arc::new(WorkflowAdapter::new(Arc::new(backend))))
}
