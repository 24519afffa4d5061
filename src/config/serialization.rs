//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a value as a TOML basic string
fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

impl Config {
    /// Serialize the configuration as a commented config file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# proofview configuration

# Where recorded proofs live: a directory path or an http(s):// URL
# (PROOFVIEW_PROOFS overrides)
proofs = {proofs}

# Web UI bind address (PROOFVIEW_BIND overrides)
bind_addr = {bind}

# How proofs are listed: "listing" scrapes the directory listing,
# "manifest" reads the manifest file below
index = {index}
manifest_name = {manifest}

# Per-request timeout when the proofs location is a URL
request_timeout_secs = {timeout}

# How long copy buttons show "Copied!"
copied_feedback_ms = {feedback}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            proofs = toml_string(&self.proofs),
            bind = toml_string(&self.bind_addr.to_string()),
            index = toml_string(self.index.as_str()),
            manifest = toml_string(&self.manifest_name),
            timeout = self.request_timeout_secs,
            feedback = self.copied_feedback_ms,
            log_level = toml_string(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = toml_string(&self.logging.file_dir.to_string_lossy()),
            log_file_rotation = toml_string(self.logging.file_rotation.as_str()),
            log_file_prefix = toml_string(&self.logging.file_prefix),
        )
    }
}
