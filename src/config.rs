//! Configuration file loading with environment variable overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variables checked for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Dotenv file in the working directory, consulted after the process
/// environment.
pub const DOTENV_FILE: &str = ".env";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Default values used when command-line flags are absent.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP form server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Google AI Studio API key.
    pub google: Option<String>,
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default model name or alias.
    pub model: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { model: "flash".to_string() }
    }
}

/// Settings for the `serve` subcommand.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Largest accepted request body, in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:8501".to_string(), max_upload_mb: 20 }
    }
}

impl ServerConfig {
    /// Body limit in bytes.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Google API key from the environment, then `.env`, then the
    /// config file.
    #[must_use]
    pub fn google_key(&self) -> Option<String> {
        let dotenv = std::fs::read_to_string(DOTENV_FILE)
            .map(|contents| parse_dotenv(&contents))
            .unwrap_or_default();
        self.google_key_with(|name| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .or_else(|| dotenv.get(name).cloned())
        })
    }

    /// Resolve the API key through the given environment lookup.
    fn google_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .chain(self.keys.google.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

/// Parse `KEY=value` lines. Comments, blank values and an `export ` prefix
/// are skipped; one level of matching quotes is removed.
#[must_use]
pub fn parse_dotenv(contents: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        let value = ['"', '\'']
            .iter()
            .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
            .unwrap_or(value);
        if key.is_empty() || value.trim().is_empty() {
            continue;
        }
        out.insert(key.to_string(), value.to_string());
    }
    out
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `DOC_DESCRIBE_CONFIG` environment variable
/// 3. `~/.config/doc-describe/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("DOC_DESCRIBE_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/doc-describe/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/doc-describe/config.toml")
    } else {
        PathBuf::from("doc-describe.toml")
    }
}
