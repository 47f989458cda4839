//! Configuration system
//!
//! Settings are layered, later layers winning:
//! - Built-in defaults
//! - The first config file found (`record-chunks.toml`, `.record-chunks.toml`,
//!   then `<config dir>/record-chunks/config.toml`), or an explicit path
//! - Environment variables
//!
//! The parser itself takes no configuration; these settings only drive the
//! command line tool's logging and output.

use crate::display::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const LOG_FORMATS: &[&str] = &["pretty", "json"];
const LOG_OUTPUTS: &[&str] = &["console", "file", "both"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Record output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: bool,
    pub json_pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            color: true,
            json_pretty: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load configuration from file, environment and defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_from_default_locations()?,
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_default_locations() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("record-chunks.toml"),
            PathBuf::from(".record-chunks.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            config_paths.push(dir.join("record-chunks").join("config.toml"));
        }

        for path in &config_paths {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.loaded_from = Some(path.to_path_buf());

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Output overrides
        if let Ok(val) = env::var("RECORD_CHUNKS_FORMAT") {
            self.output.format = val.parse().context("Invalid RECORD_CHUNKS_FORMAT")?;
        }
        if let Ok(val) = env::var("RECORD_CHUNKS_COLOR") {
            self.output.color = val.parse().context("Invalid RECORD_CHUNKS_COLOR")?;
        }
        if let Ok(val) = env::var("RECORD_CHUNKS_JSON_PRETTY") {
            self.output.json_pretty = val.parse().context("Invalid RECORD_CHUNKS_JSON_PRETTY")?;
        }

        // Path overrides
        if let Ok(val) = env::var("RECORD_CHUNKS_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let format = self.logging.format.to_ascii_lowercase();
        if !LOG_FORMATS.contains(&format.as_str()) {
            anyhow::bail!(
                "Log format must be one of {:?}, got {}",
                LOG_FORMATS,
                self.logging.format
            );
        }

        let output = self.logging.output.to_ascii_lowercase();
        if !LOG_OUTPUTS.contains(&output.as_str()) {
            anyhow::bail!(
                "Log output must be one of {:?}, got {}",
                LOG_OUTPUTS,
                self.logging.output
            );
        }

        if self.logs_to_file() && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }

    /// Settings that are valid but have no effect. Reported by the caller
    /// once logging is up.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.output.json_pretty && self.output.format != OutputFormat::Json {
            warnings.push(format!(
                "json_pretty only applies to the json output format, not {}",
                self.output.format
            ));
        }
        warnings
    }

    pub fn logs_to_file(&self) -> bool {
        matches!(
            self.logging.output.to_ascii_lowercase().as_str(),
            "file" | "both"
        )
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}
