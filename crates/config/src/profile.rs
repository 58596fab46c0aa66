use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use colcompare_engine::column::letters_to_index;
use colcompare_engine::compare::Side;

use crate::settings::OutputKind;
use crate::ConfigError;

// ---------------------------------------------------------------------------
// Top-level profile
// ---------------------------------------------------------------------------

/// A saved comparison: which file, which two columns, where to write.
///
/// Every field is optional so a profile can pin only part of a comparison
/// and leave the rest to command-line flags.
///
/// ```toml
/// name = "Customer ids"
/// file = "customers.xlsx"
///
/// [first]
/// sheet = "CRM"
/// column = "A"
///
/// [second]
/// sheet = "Billing"
/// column = "C"
///
/// [output]
/// format = "csv"
/// path = "missing.csv"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CompareProfile {
    #[serde(default)]
    pub name: Option<String>,
    /// Workbook path; relative paths resolve against the profile's directory
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub first: SideConfig,
    #[serde(default)]
    pub second: SideConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SideConfig {
    pub sheet: Option<String>,
    pub column: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputKind>,
    pub path: Option<PathBuf>,
}

impl CompareProfile {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let profile: CompareProfile =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Read a profile file. Relative `file` and `output.path` entries are
    /// rebased onto the profile's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let mut profile = Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse(msg) => ConfigError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        if let Some(base) = path.parent() {
            profile.file = profile.file.map(|f| rebase(base, f));
            profile.output.path = profile.output.path.map(|p| rebase(base, p));
        }
        log::debug!("loaded profile {}", path.display());
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in [Side::First, Side::Second] {
            let config = self.side(side);

            if let Some(sheet) = &config.sheet {
                if sheet.is_empty() {
                    return Err(ConfigError::Validation(format!("{side}.sheet must not be empty")));
                }
            }

            if let Some(column) = &config.column {
                if letters_to_index(column).is_none() {
                    return Err(ConfigError::Validation(format!(
                        "{side}.column {column:?} is not a column letter (expected A, B, ..., AA, ...)"
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn side(&self, side: Side) -> &SideConfig {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
