// Application settings
// Read from ~/.config/colcompare/settings.json (never written)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "COLCOMPARE_SETTINGS";

/// How results are printed when no `--out` is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Human-readable lists (default)
    #[default]
    Text,
    Json,
    Csv,
    Tsv,
    /// Only valid together with an output file
    Xlsx,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Output
    #[serde(rename = "output.format")]
    pub output_format: OutputKind,

    /// Cap on values printed per list in text output. None = print all.
    #[serde(rename = "output.maxListed")]
    pub max_listed: Option<usize>,

    /// Print the load/compare status line on stderr
    #[serde(rename = "output.showStatus")]
    pub show_status: bool,

    // Compare
    /// Exit non-zero when the columns differ
    #[serde(rename = "compare.strictExit")]
    pub strict_exit: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_format: OutputKind::Text,
            max_listed: None,
            show_status: true,
            strict_exit: false,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("colcompare");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults.
    ///
    /// A missing file is normal; a broken one is logged and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings file at {}", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents).map_err(|e| match e {
            ConfigError::Parse(msg) => ConfigError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
