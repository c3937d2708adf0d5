use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::paths::home_env_path;

pub const BASE_URL_ENV: &str = "AGENT_STUDIO_DOMAIN";
pub const API_KEY_ENV: &str = "CDSW_APIV2_KEY";
pub const VERIFY_TLS_ENV: &str = "AGENT_STUDIO_VERIFY_TLS";

static ENV_FILES_ONCE: OnceLock<()> = OnceLock::new();

/// Backend connection settings, fixed for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub base_url: String,
    pub api_key: String,
    pub verify_tls: bool,
}

impl fmt::Debug for StudioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl StudioConfig {
    /// Resolve settings from CLI overrides, then the environment (after
    /// loading `.env` files), then the optional YAML file.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        ensure_env_files_loaded();
        let file = match &overrides.config_path {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(overrides, &EnvValues::capture(), file))
    }

    fn merge(overrides: &ConfigOverrides, env: &EnvValues, file: FileConfig) -> Self {
        let base_url = first_present([overrides.base_url.clone(), env.base_url.clone(), file.base_url]);
        let api_key = first_present([overrides.api_key.clone(), env.api_key.clone(), file.api_key]);
        let verify_tls = overrides.verify_tls
            || env.verify_tls.unwrap_or(false)
            || file.verify_tls.unwrap_or(false);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            verify_tls,
        }
    }

    /// Names of settings left empty. Empty values are accepted, but every
    /// backend call will fail with a connection or authorization error.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.is_empty() {
            missing.push(BASE_URL_ENV);
        }
        if self.api_key.is_empty() {
            missing.push(API_KEY_ENV);
        }
        missing
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub verify_tls: bool,
}

/// Optional YAML configuration file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub verify_tls: Option<bool>,
}

impl FileConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let raw = fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file at {}", path_ref.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid configuration in {}", path_ref.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Unable to parse config YAML")
    }
}

impl FromStr for FileConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml_str(s)
    }
}

#[derive(Debug, Default)]
struct EnvValues {
    base_url: Option<String>,
    api_key: Option<String>,
    verify_tls: Option<bool>,
}

impl EnvValues {
    fn capture() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV).ok(),
            api_key: std::env::var(API_KEY_ENV).ok(),
            verify_tls: std::env::var(VERIFY_TLS_ENV).ok().map(|v| parse_flag(&v)),
        }
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Load `./.env`, then the home `.env`, without overriding variables that
/// are already set. Runs at most once per process; the binary calls it
/// before starting any other thread.
pub fn ensure_env_files_loaded() {
    ENV_FILES_ONCE.get_or_init(|| {
        let candidates = [Some(PathBuf::from(".env")), home_env_path()];
        for path in candidates.into_iter().flatten() {
            if let Ok(contents) = fs::read_to_string(&path) {
                apply_env_contents(&contents);
            }
        }
    });
}

fn apply_env_contents(contents: &str) {
    for (key, value) in contents.lines().filter_map(parse_env_line) {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        unsafe {
            std::env::set_var(&key, &value);
        }
    }
}

fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(value.trim()).to_string()))
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}
