use std::{fs, path::Path};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_NAME: &str = "agent-studio-mcp.log";

/// Initializes the tracing subscriber with layered output:
/// 1. Stderr: formatted based on `log_json` and `verbose`. Stdout belongs to
///    the MCP stdio transport and must never receive log lines.
/// 2. File: full JSON debug logs in `log_dir` (if provided).
///
/// Returns a WorkerGuard that must be held by main() to ensure file logs are flushed.
pub fn init(
    verbose: bool,
    log_json: bool,
    log_dir: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_env_filter(verbose));

    let (file_layer, guard) = match log_dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(Targets::new().with_default(tracing::Level::DEBUG));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log dir {}: {e}", dir.display());
                (None, None)
            }
        },
        None => (None, None),
    };

    let stderr_layer: Box<dyn Layer<Registry> + Send + Sync> = if log_json {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
    } else if verbose {
        Box::new(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false)
                .with_level(true)
                .with_filter(stderr_filter),
        )
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn default_env_filter(verbose: bool) -> EnvFilter {
    let directives = if verbose {
        "agent_studio_mcp=debug,rmcp=info,info"
    } else {
        "agent_studio_mcp=info,rmcp=warn,warn"
    };
    EnvFilter::new(directives)
}
