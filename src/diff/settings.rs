//! Comparison settings for the differencing engine.
//!
//! Provides three loading methods:
//! - `DiffSettings::default()` - The standard comparison rules
//! - `load_settings(path)` - Loads settings from a TOML file
//! - `load_user_settings()` - Loads the per-user settings file if present

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How `Grade` and `OverallGrade` entries are compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeSettings {
    /// Compare letters; otherwise compare numeric grades within tolerance
    pub use_grade_letter: bool,
    pub grade_value_tolerance: f64,
}

impl Default for GradeSettings {
    fn default() -> Self {
        Self {
            use_grade_letter: true,
            grade_value_tolerance: 0.1,
        }
    }
}

/// How `GradeValue` entries are compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeValueSettings {
    /// Compare letters (takes precedence over the other switches)
    pub use_grade_letter: bool,
    pub grade_value_tolerance: f64,
    /// Compare raw measurements instead of numeric grades
    pub use_value: bool,
    pub value_tolerance: f64,
}

impl Default for GradeValueSettings {
    fn default() -> Self {
        Self {
            use_grade_letter: true,
            grade_value_tolerance: 0.01,
            use_value: false,
            value_tolerance: 0.1,
        }
    }
}

/// How `ValuePassFail` entries are compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueResultSettings {
    /// Compare outcomes; otherwise compare values within tolerance
    pub use_result: bool,
    pub value_tolerance: f64,
}

impl Default for ValueResultSettings {
    fn default() -> Self {
        Self {
            use_result: true,
            value_tolerance: 5.0,
        }
    }
}

/// How plain `ValueDouble` entries are compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueSettings {
    pub value_tolerance: f64,
}

impl Default for ValueSettings {
    fn default() -> Self {
        Self {
            value_tolerance: 5.0,
        }
    }
}

/// All comparison switches. Every section and field is optional in TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    pub grade: GradeSettings,
    pub grade_value: GradeValueSettings,
    pub value_result: ValueResultSettings,
    pub value: ValueSettings,
}

/// Load settings from a TOML file at the given path.
///
/// # Returns
/// * `Ok(DiffSettings)` - Parsed settings, defaults filled in
/// * `Err` - If file cannot be read or TOML is invalid
pub fn load_settings(path: &Path) -> Result<DiffSettings> {
    let content = std::fs::read_to_string(path)?;
    let settings: DiffSettings = toml::from_str(&content)?;
    Ok(settings)
}

/// Per-user settings location: `<config dir>/sectorval/diff_settings.toml`.
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sectorval").join("diff_settings.toml"))
}

/// Load the per-user settings file, or the defaults when there is none.
pub fn load_user_settings() -> Result<DiffSettings> {
    match user_settings_path() {
        Some(path) if path.exists() => {
            debug!("Loading diff settings from {:?}", path);
            load_settings(&path)
        }
        _ => {
            debug!("No user diff settings, using defaults");
            Ok(DiffSettings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = DiffSettings::default();
        assert!(settings.grade.use_grade_letter);
        assert_eq!(settings.grade.grade_value_tolerance, 0.1);
        assert!(settings.grade_value.use_grade_letter);
        assert!(!settings.grade_value.use_value);
        assert_eq!(settings.grade_value.grade_value_tolerance, 0.01);
        assert_eq!(settings.grade_value.value_tolerance, 0.1);
        assert!(settings.value_result.use_result);
        assert_eq!(settings.value_result.value_tolerance, 5.0);
        assert_eq!(settings.value.value_tolerance, 5.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[value]\nvalue_tolerance = 2.5\n\n[grade_value]\nuse_grade_letter = false").unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.value.value_tolerance, 2.5);
        assert!(!settings.grade_value.use_grade_letter);
        assert_eq!(
            settings.grade_value.grade_value_tolerance, 0.01,
            "Unspecified fields keep their defaults"
        );
        assert_eq!(settings.grade, GradeSettings::default());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[value]\nvalue_tolerance = \"wide\"").unwrap();
        assert!(load_settings(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_user_settings_path_shape() {
        if let Some(path) = user_settings_path() {
            assert!(path.ends_with("sectorval/diff_settings.toml"));
        }
    }
}
