//! Application configuration.
//!
//! Values are layered: built-in defaults, then `<config_dir>/escale/config.toml`,
//! then `ESCALE__SECTION__KEY` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::hazard::KeywordClassifier;

const CONFIG_DIR: &str = "escale";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# escale configuration

[analysis]
# Whole-word, case-insensitive keywords that mark commodity text as dangerous.
hazard_keywords = ["DGX", "DANGEROUS", "HAZ", "IMO", "HAZMAT"]
# Class written on rows flagged by keyword only.
detected_class_label = "DETECTED (DGX)"

[logging]
# Relative paths are resolved against the working directory.
directory = "logs"
file_name = "escale.log"
"#;

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dangerous-goods detection.
    pub analysis: AnalysisSettings,
    /// Log file location.
    pub logging: LoggingSettings,
}

/// Settings of the dangerous-goods text heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Keywords matched as whole words, ignoring case.
    pub hazard_keywords: Vec<String>,
    /// Class label for keyword-only detections.
    pub detected_class_label: String,
}

impl AnalysisSettings {
    /// Build the classifier described by these settings.
    pub fn classifier(&self) -> Result<KeywordClassifier, regex::Error> {
        KeywordClassifier::new(&self.hazard_keywords, &self.detected_class_label)
    }
}

/// Where the binary writes its log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Directory holding the log file, created on start-up.
    pub directory: PathBuf,
    /// Log file name; lines are appended.
    pub file_name: String,
}

impl LoggingSettings {
    /// Full path of the log file.
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings {
                hazard_keywords: crate::hazard::DEFAULT_HAZARD_KEYWORDS
                    .iter()
                    .map(|keyword| keyword.to_string())
                    .collect(),
                detected_class_label: crate::hazard::DETECTED_CLASS_LABEL.to_string(),
            },
            logging: LoggingSettings {
                directory: PathBuf::from("logs"),
                file_name: "escale.log".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load with `path` as the optional user file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("ESCALE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("analysis.hazard_keywords"),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {path:?}"))?;

        settings
            .try_deserialize()
            .context("invalid configuration values")
    }
}

/// Default path of the user configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_config_at(&path)?;
    Ok(path)
}

/// Write the commented default file at `path` unless it already exists.
pub fn ensure_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {parent:?}"))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {path:?}"))?;
    info!("Wrote default configuration to {path:?}");
    Ok(())
}
