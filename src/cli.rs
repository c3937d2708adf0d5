use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;

/// Agent Studio MCP server command line.
#[derive(Debug, Parser)]
#[command(name = "agent-studio-mcp")]
#[command(about = "MCP server exposing Agent Studio workflow management as tools", version)]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,

    #[arg(long, global = true, help = "Verbose logging with timestamps and targets")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines on stderr")]
    pub log_json: bool,

    #[arg(long, global = true, help = "Also write JSON debug logs to the default log directory")]
    pub log_file: bool,

    #[arg(long, global = true, help = "Write JSON debug logs into this directory")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The subcommand to run; a bare invocation serves over stdio.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[derive(Debug, Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the workflow tools to an MCP host over stdin/stdout.
    Serve,
    /// List the tools this server registers.
    Tools(ToolsArgs),
    /// Run one tool directly against the backend and print its JSON result.
    Invoke(InvokeArgs),
}

#[derive(Debug, Args, Clone, Default, PartialEq, Eq)]
pub struct ToolsArgs {
    #[arg(long, help = "Print tool definitions as JSON")]
    pub json: bool,
}

#[derive(Debug, Args, Clone, PartialEq, Eq)]
pub struct InvokeArgs {
    #[arg(long, help = "Tool name, e.g. list_current_workflows")]
    pub tool: String,

    #[arg(long, default_value = "{}", help = "Tool arguments as a JSON object")]
    pub args: String,
}

/// Backend connection flags shared by every command.
#[derive(Debug, Args, Clone, Default)]
pub struct BackendArgs {
    #[arg(long, global = true, help = "Optional YAML file with base_url, api_key, verify_tls")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Agent Studio base address (or AGENT_STUDIO_DOMAIN)")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Bearer token (or CDSW_APIV2_KEY)")]
    pub api_key: Option<String>,

    #[arg(long, global = true, help = "Verify the backend's TLS certificate")]
    pub verify_tls: bool,
}

impl BackendArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            verify_tls: self.verify_tls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::parse_from(["agent-studio-mcp"]);
        assert_eq!(cli.command(), Commands::Serve);
        assert!(!cli.backend.verify_tls);
    }

    #[test]
    fn parses_invoke_command_with_backend_flags() {
        let cli = Cli::parse_from([
            "agent-studio-mcp",
            "invoke",
            "--tool",
            "create_workflow",
            "--args",
            r#"{"name":"A","description":"B"}"#,
            "--base-url",
            "https://studio.example.com",
            "--verbose",
        ]);

        match cli.command() {
            Commands::Invoke(invoke) => {
                assert_eq!(invoke.tool, "create_workflow");
                assert!(invoke.args.contains("\"name\""));
            }
            other => panic!("expected invoke command, got {other:?}"),
        }
        assert!(cli.verbose);
        let overrides = cli.backend.overrides();
        assert_eq!(overrides.base_url.as_deref(), Some("https://studio.example.com"));
        assert!(overrides.api_key.is_none());
    }

    #[test]
    fn invoke_args_default_to_empty_object() {
        let cli = Cli::parse_from(["agent-studio-mcp", "invoke", "--tool", "list_current_workflows"]);
        match cli.command() {
            Commands::Invoke(invoke) => assert_eq!(invoke.args, "{}"),
            other => panic!("expected invoke command, got {other:?}"),
        }
    }
}
