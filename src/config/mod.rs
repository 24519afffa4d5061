//! Configuration for the proof viewer
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/proofview/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! Command-line flags are applied on top by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod logging;
mod serialization;

#[cfg(test)]
mod tests;

pub use logging::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_PROOFS: &str = "./proofs";
const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000);
const DEFAULT_MANIFEST: &str = "index.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COPIED_FEEDBACK_MS: u64 = 2000;

// ─────────────────────────────────────────────────────────────────────────────
// Index Strategy
// ─────────────────────────────────────────────────────────────────────────────

/// How the list of proofs is obtained from the proofs location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexStrategy {
    /// Scrape the directory listing for `*.json` entries (default)
    #[default]
    Listing,
    /// Read a manifest file that names the proofs
    Manifest,
}

impl IndexStrategy {
    /// Parse strategy string from config; unknown values fall back to listing
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "manifest" => Self::Manifest,
            _ => Self::Listing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Manifest => "manifest",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Proofs location: a directory path or an http(s) URL
    pub proofs: String,

    /// Address to bind the viewer's web UI to
    pub bind_addr: SocketAddr,

    /// How proofs are listed
    pub index: IndexStrategy,

    /// File name of the manifest inside the proofs location
    pub manifest_name: String,

    /// Timeout for each HTTP request to the proofs location
    pub request_timeout_secs: u64,

    /// How long a copy button shows its "Copied!" label
    pub copied_feedback_ms: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proofs: DEFAULT_PROOFS.to_string(),
            bind_addr: DEFAULT_BIND,
            index: IndexStrategy::default(),
            manifest_name: DEFAULT_MANIFEST.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            copied_feedback_ms: DEFAULT_COPIED_FEEDBACK_MS,
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub proofs: Option<String>,
    pub bind_addr: Option<String>,
    pub index: Option<String>,
    pub manifest_name: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub copied_feedback_ms: Option<u64>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/proofview/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("proofview").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        // Config::default().to_toml() is the template
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Overwrite the config file with defaults
    pub fn reset_config_file() -> Result<PathBuf> {
        let path = Self::config_path().context("Could not determine home directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, Self::default().to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be read or parsed ends the process
    /// with a clear message rather than silently falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\nCONFIG ERROR - Failed to parse configuration file\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Numbers written as strings (timeouts are plain integers)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `proofview config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\nCONFIG ERROR - Cannot read configuration file\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Result<Self> {
        let file = Self::load_file_config();
        Self::from_layers(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups
    pub(crate) fn from_layers(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        // Proofs location: env > file > default
        let proofs = env("PROOFVIEW_PROOFS")
            .or(file.proofs)
            .unwrap_or(defaults.proofs);

        // Bind address: env > file > default
        let bind_addr = match env("PROOFVIEW_BIND").or(file.bind_addr) {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid bind address: {}", addr))?,
            None => defaults.bind_addr,
        };

        let index = file
            .index
            .map(|s| IndexStrategy::parse(&s))
            .unwrap_or(defaults.index);

        let manifest_name = file
            .manifest_name
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.manifest_name);

        let request_timeout_secs = file
            .request_timeout_secs
            .unwrap_or(defaults.request_timeout_secs);

        let copied_feedback_ms = file
            .copied_feedback_ms
            .unwrap_or(defaults.copied_feedback_ms);

        let logging = LoggingConfig::from_file(file.logging);

        Ok(Self {
            proofs,
            bind_addr,
            index,
            manifest_name,
            request_timeout_secs,
            copied_feedback_ms,
            logging,
        })
    }
}
