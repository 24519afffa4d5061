// CLI module - command-line argument parsing and handlers
//
// Provides subcommands:
// - serve (default): start the local viewer
// - list: print discovered proof ids, newest first
// - render: write one proof as a standalone HTML page
// - config --show|--reset|--path: configuration management

use crate::config::{Config, VERSION};
use crate::discovery::ProofSource;
use crate::render::{self, page};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// proofview - browse proof-session transcripts
#[derive(Debug, Parser)]
#[command(name = "proofview")]
#[command(version = VERSION)]
#[command(about = "Viewer for proof-session transcripts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the local viewer (default)
    Serve {
        /// Proofs directory or URL
        #[arg(long)]
        proofs: Option<String>,

        /// Address to serve the viewer on
        #[arg(long)]
        bind: Option<String>,
    },

    /// List discovered proofs, newest first
    List {
        /// Proofs directory or URL
        #[arg(long)]
        proofs: Option<String>,
    },

    /// Render one proof as a standalone HTML page
    Render {
        /// Proof id (file name without .json)
        id: String,

        /// Proofs directory or URL
        #[arg(long)]
        proofs: Option<String>,

        /// Output file ("-" or omitted for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

impl Cli {
    /// Command-line flags take precedence over env and file
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        let (proofs, bind) = match &self.command {
            Some(Commands::Serve { proofs, bind }) => (proofs, bind.as_ref()),
            Some(Commands::List { proofs }) | Some(Commands::Render { proofs, .. }) => {
                (proofs, None)
            }
            Some(Commands::Config { .. }) | None => return Ok(()),
        };

        if let Some(proofs) = proofs {
            config.proofs = proofs.clone();
        }
        if let Some(bind) = bind {
            config.bind_addr = bind
                .parse()
                .with_context(|| format!("Invalid bind address: {}", bind))?;
        }
        Ok(())
    }
}

/// Handle `config` flags
pub fn handle_config(show: bool, reset: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        // No flag provided, show help
        println!("Usage: proofview config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read confirmation")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let path = Config::reset_config_file()?;
    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

/// Print discovered ids, newest first
pub async fn run_list(config: &Config) -> Result<()> {
    let source = ProofSource::from_config(config)?;
    let ids = source
        .discover()
        .await
        .with_context(|| format!("Discovery failed at {}", source.describe()))?;

    if ids.is_empty() {
        eprintln!("{}", crate::viewer::NO_PROOFS_MESSAGE);
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    Ok(())
}

/// Write one proof as a standalone page to `output` (stdout when absent or "-")
pub async fn run_render(config: &Config, id: &str, output: Option<&PathBuf>) -> Result<()> {
    let source = ProofSource::from_config(config)?;
    let doc = source.load(id).await?;

    let view = render::render_proof(&doc, &[], Utc::now());
    let html = page::standalone_page(&format!("Proof {}", id), &view.html);
    tracing::info!("Rendered proof {} ({} steps)", id, view.step_count);

    match output.filter(|path| path.as_os_str() != "-") {
        Some(path) => {
            std::fs::write(path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => std::io::stdout().lock().write_all(html.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["proofview"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "proofview",
            "serve",
            "--proofs",
            "https://example.com/proofs",
            "--bind",
            "0.0.0.0:9000",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config).unwrap();
        assert_eq!(config.proofs, "https://example.com/proofs");
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");
    }

    #[test]
    fn test_invalid_bind_flag() {
        let cli = Cli::try_parse_from(["proofview", "serve", "--bind", "nope"]).unwrap();
        let err = cli.apply_overrides(&mut Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid bind address: nope");
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::try_parse_from(["proofview", "render", "p1", "-o", "out.html"]).unwrap();
        match cli.command {
            Some(Commands::Render { id, output, proofs }) => {
                assert_eq!(id, "p1");
                assert_eq!(output, Some(PathBuf::from("out.html")));
                assert!(proofs.is_none());
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_render_writes_standalone_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("p1.json"),
            r#"{"claim": "1 + 1 = 2", "events": [{"type": "model_output", "content": {"current_step": "add"}}]}"#,
        )
        .unwrap();
        let out = dir.path().join("p1.html");

        let config = Config {
            proofs: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        run_render(&config, "p1", Some(&out)).await.unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("1 + 1 = 2"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn test_render_missing_proof() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            proofs: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        };
        let err = run_render(&config, "nope", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Proof nope not found");
    }
}
