use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

/// Layering rules: no file under `dir` may mention `needle` outside its
/// `#[cfg(test)]` module.
const LAYER_RULES: &[(&str, &str)] = &[
    ("src/core", "crate::adapters"),
    ("src/core", "crate::application"),
    ("src/core", "rmcp"),
    ("src/core", "reqwest"),
    ("src/application", "crate::adapters"),
    ("src/application", "rmcp"),
];

#[derive(Parser)]
#[command(author, version, about = "Workspace maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the core/application/adapters layering.
    CheckArchitecture,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::CheckArchitecture => check_architecture(),
    }
}

fn check_architecture() -> Result<()> {
    let mut failures = Vec::new();
    for (dir, needle) in LAYER_RULES {
        if let Err(err) = ensure_no_pattern(dir, needle) {
            failures.push(err.to_string());
        }
    }
    if failures.is_empty() {
        eprintln!("layering ok ({} rules)", LAYER_RULES.len());
        Ok(())
    } else {
        Err(anyhow!(failures.join("\n")))
    }
}

fn ensure_no_pattern(dir: &str, needle: &str) -> Result<()> {
    let mut offenders = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                offenders.push(format!("{dir} (walk error: {e})"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("rs") {
            continue;
        }
        if production_source(entry.path())?.contains(needle) {
            offenders.push(entry.path().display().to_string());
        }
    }

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Forbidden reference to '{needle}' found in: {}",
            offenders.join(", ")
        ))
    }
}

/// File contents up to the first `#[cfg(test)]`. Test modules may wire in
/// adapters as fixtures.
fn production_source(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match content.find("#[cfg(test)]") {
        Some(idx) => content[..idx].to_string(),
        None => content,
    })
}
