use std::path::PathBuf;

/// Returns the user's home directory using common environment variables.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("AGENT_STUDIO_MCP_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(PathBuf::from)
        })
}

/// Returns the default path to ~/.env (or $AGENT_STUDIO_MCP_HOME/.env if set).
pub fn home_env_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join(".env"))
}

/// Default directory for `--log-file` output.
pub fn default_log_dir() -> PathBuf {
    home_dir()
        .map(|dir| dir.join(".agent-studio-mcp"))
        .unwrap_or_else(|| PathBuf::from(".agent-studio-mcp"))
        .join("logs")
}
