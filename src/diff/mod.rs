//! Tolerance-aware comparison of stored and current sectors.
//!
//! # Architecture
//!
//! - **Settings**: `DiffSettings`, one section per comparator family,
//!   defaulted field by field and loadable from TOML
//! - **Engine**: `DiffEngine` compares parameters, alarms and OCV text
//! - **Results**: `SectorDifferences`, a sparse record of what changed
//!
//! Comparison is driven by the stored side. A parameter the current report
//! adds is not a difference; a parameter it drops is.
//!
//! # Example
//!
//! ```ignore
//! use sectorval::diff::{compare, DiffEngine, DiffSettings};
//!
//! let diff = compare(&stored.report().parameters, &current.report().parameters);
//! if diff.is_not_empty() {
//!     println!("{} changed", diff.parameters.len());
//! }
//!
//! let engine = DiffEngine::new(DiffSettings::default());
//! let changes = engine.compare_sector_sets(&stored_sectors, &current_sectors);
//! ```

mod engine;
mod settings;
mod types;

pub use engine::DiffEngine;
pub use settings::{
    load_settings, load_user_settings, user_settings_path, DiffSettings, GradeSettings,
    GradeValueSettings, ValueResultSettings, ValueSettings,
};
pub use types::{SectorDifferences, SymbologyMismatch};

use crate::report::ParameterSet;
use crate::sector::Sector;

/// Compare two parameter collections with the default settings.
///
/// The result carries no sector name; alarms and OCV text are not compared.
pub fn compare(stored: &ParameterSet, current: &ParameterSet) -> SectorDifferences {
    let engine = DiffEngine::default();
    SectorDifferences {
        parameters: engine.compare_parameters(stored, current),
        ..SectorDifferences::default()
    }
}

/// Compare two sets of sectors, matched by name, under the given settings.
pub fn compare_sector_sets(
    stored: &[Sector],
    current: &[Sector],
    settings: &DiffSettings,
) -> Vec<SectorDifferences> {
    DiffEngine::new(settings.clone()).compare_sector_sets(stored, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Parameter;
    use crate::grade::Grade;
    use crate::report::{Alarm, Outcome, ParameterValue};

    fn contrast(grade: f64) -> ParameterValue {
        ParameterValue::GradeValue {
            parameter: Parameter::SymbolContrast,
            value: 70.0,
            grade: Grade::new(grade),
        }
    }

    fn reflectance(value: f64) -> ParameterValue {
        ParameterValue::ValueDouble {
            parameter: Parameter::MinimumReflectance,
            value,
        }
    }

    // ==================== Letter scenario ====================

    #[test]
    fn test_symbol_contrast_same_letter_no_diff() {
        let stored: ParameterSet = vec![contrast(3.95)].into();
        let current: ParameterSet = vec![contrast(3.1)].into();

        let diff = compare(&stored, &current);
        assert!(!diff.is_not_empty(), "3.95 and 3.1 are both B");
    }

    #[test]
    fn test_symbol_contrast_letter_change_is_diff() {
        let stored: ParameterSet = vec![contrast(3.95)].into();
        let current: ParameterSet = vec![contrast(2.95)].into();

        let diff = compare(&stored, &current);
        assert!(diff.is_not_empty());
        assert_eq!(diff.parameters, vec![contrast(2.95)], "Reports the current entry");
    }

    // ==================== Tolerance window ====================

    #[test]
    fn test_value_tolerance_window() {
        let stored: ParameterSet = vec![reflectance(40.0)].into();

        let near: ParameterSet = vec![reflectance(44.0)].into();
        assert!(!compare(&stored, &near).is_not_empty());

        let edge: ParameterSet = vec![reflectance(45.0)].into();
        assert!(!compare(&stored, &edge).is_not_empty(), "Window is inclusive");

        let far: ParameterSet = vec![reflectance(46.0)].into();
        assert_eq!(compare(&stored, &far).parameters, vec![reflectance(46.0)]);
    }

    #[test]
    fn test_custom_tolerance() {
        let mut settings = DiffSettings::default();
        settings.value.value_tolerance = 1.0;
        let engine = DiffEngine::new(settings);

        let stored: ParameterSet = vec![reflectance(40.0)].into();
        let current: ParameterSet = vec![reflectance(44.0)].into();
        assert_eq!(engine.compare_parameters(&stored, &current).len(), 1);
    }

    // ==================== Identity ====================

    #[test]
    fn test_self_diff_is_empty() {
        let set: ParameterSet = vec![
            contrast(3.2),
            reflectance(12.0),
            ParameterValue::PassFail {
                parameter: Parameter::QuietZone,
                result: Outcome::Fail,
            },
            ParameterValue::Missing {
                parameter: Parameter::Modulation,
            },
            ParameterValue::ValueString {
                parameter: Parameter::ErrorCorrectionLevel,
                value: "M".to_string(),
            },
        ]
        .into();

        assert!(!compare(&set, &set).is_not_empty());
    }

    #[test]
    fn test_pass_fail_outcome_change() {
        let stored: ParameterSet = vec![ParameterValue::PassFail {
            parameter: Parameter::QuietZone,
            result: Outcome::Pass,
        }]
        .into();
        let current: ParameterSet = vec![ParameterValue::PassFail {
            parameter: Parameter::QuietZone,
            result: Outcome::Fail,
        }]
        .into();
        assert!(compare(&stored, &current).is_not_empty());
    }

    // ==================== Alarms ====================

    #[test]
    fn test_alarm_symmetric_difference() {
        let engine = DiffEngine::default();
        let a = Alarm::warning("A");
        let b = Alarm::warning("B");
        let c = Alarm::error("C");

        let diff = engine.compare_alarms(&[a.clone(), b.clone()], &[b, c.clone()]);
        assert_eq!(diff, vec![a, c]);
    }

    #[test]
    fn test_identical_alarms_no_diff() {
        let engine = DiffEngine::default();
        let alarms = vec![Alarm::warning("A"), Alarm::error("B")];
        assert!(engine.compare_alarms(&alarms, &alarms).is_empty());
    }
}
