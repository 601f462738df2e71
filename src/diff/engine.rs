//! Stored-versus-current comparison.
//!
//! The `DiffEngine` applies one comparator per parameter variant, checks
//! alarms in both directions and reports sector-level mismatches.

use tracing::{debug, info};

use crate::catalog::Family;
use crate::report::{Alarm, ParameterSet, ParameterValue};
use crate::sector::Sector;

use super::settings::DiffSettings;
use super::types::{SectorDifferences, SymbologyMismatch};

fn within(stored: f64, current: f64, tolerance: f64) -> bool {
    (current - stored).abs() <= tolerance
}

/// The differencing engine.
pub struct DiffEngine {
    settings: DiffSettings,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DiffSettings::default())
    }
}

impl DiffEngine {
    /// Create an engine with the given comparison settings.
    pub fn new(settings: DiffSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DiffSettings {
        &self.settings
    }

    /// Whether two entries for the same parameter count as equal.
    ///
    /// Entries of different variants are never equal.
    pub fn values_equal(&self, stored: &ParameterValue, current: &ParameterValue) -> bool {
        use ParameterValue as V;

        match (stored, current) {
            (V::Missing { .. }, V::Missing { .. }) => true,
            (V::Grade { grade: s, .. }, V::Grade { grade: c, .. }) => {
                let rules = &self.settings.grade;
                if rules.use_grade_letter {
                    s.letter() == c.letter()
                } else {
                    within(s.value(), c.value(), rules.grade_value_tolerance)
                }
            }
            (V::OverallGrade(s), V::OverallGrade(c)) => {
                let rules = &self.settings.grade;
                if rules.use_grade_letter {
                    s.grade.letter() == c.grade.letter()
                } else {
                    within(s.grade.value(), c.grade.value(), rules.grade_value_tolerance)
                }
            }
            (
                V::GradeValue {
                    value: sv,
                    grade: sg,
                    ..
                },
                V::GradeValue {
                    value: cv,
                    grade: cg,
                    ..
                },
            ) => {
                let rules = &self.settings.grade_value;
                if rules.use_grade_letter {
                    sg.letter() == cg.letter()
                } else if rules.use_value {
                    within(*sv, *cv, rules.value_tolerance)
                } else {
                    within(sg.value(), cg.value(), rules.grade_value_tolerance)
                }
            }
            (V::PassFail { result: s, .. }, V::PassFail { result: c, .. }) => s == c,
            (
                V::ValuePassFail {
                    value: sv,
                    result: sr,
                    ..
                },
                V::ValuePassFail {
                    value: cv,
                    result: cr,
                    ..
                },
            ) => {
                let rules = &self.settings.value_result;
                if rules.use_result {
                    sr == cr
                } else {
                    within(*sv, *cv, rules.value_tolerance)
                }
            }
            (V::ValueDouble { value: s, .. }, V::ValueDouble { value: c, .. }) => {
                within(*s, *c, self.settings.value.value_tolerance)
            }
            (V::ValueString { value: s, .. }, V::ValueString { value: c, .. }) => s == c,
            (V::Gs1Decode(s), V::Gs1Decode(c)) => s.result == c.result,
            _ => false,
        }
    }

    /// Compare two parameter collections, driven by the stored side.
    ///
    /// A stored parameter with no current counterpart is reported as the
    /// stored entry; a differing parameter is reported as the current entry.
    pub fn compare_parameters(
        &self,
        stored: &ParameterSet,
        current: &ParameterSet,
    ) -> Vec<ParameterValue> {
        stored
            .iter()
            .filter_map(|s| match current.get(s.parameter()) {
                None => Some(s.clone()),
                Some(c) if !self.values_equal(s, c) => Some(c.clone()),
                Some(_) => None,
            })
            .collect()
    }

    /// Symmetric alarm difference, matched by name.
    ///
    /// An alarm on only one side is reported as-is. An alarm on both sides
    /// with a different category or sub-alarm detail is reported once, as
    /// the current version.
    pub fn compare_alarms(&self, stored: &[Alarm], current: &[Alarm]) -> Vec<Alarm> {
        let mut differences = Vec::new();

        for s in stored {
            match current.iter().find(|c| c.name == s.name) {
                None => differences.push(s.clone()),
                Some(c) if c.category != s.category || c.detail != s.detail => {
                    differences.push(c.clone())
                }
                Some(_) => {}
            }
        }

        for c in current {
            if !stored.iter().any(|s| s.name == c.name) {
                differences.push(c.clone());
            }
        }

        differences
    }

    /// Compare two name-matched sectors.
    pub fn compare_sectors(&self, stored: &Sector, current: &Sector) -> SectorDifferences {
        let mut result = SectorDifferences::new(stored.name(), stored.username());

        if stored.symbology() != current.symbology() {
            debug!(
                "Sector '{}' symbology changed: {} -> {}",
                stored.name(),
                stored.symbology(),
                current.symbology()
            );
            result.symbology_mismatch = Some(SymbologyMismatch {
                stored: stored.symbology(),
                current: current.symbology(),
            });
            return result;
        }

        if stored.symbology().family() == Family::Ocr {
            if let (Some(s), Some(c)) = (&stored.report().ocr, &current.report().ocr) {
                if s.text != c.text {
                    result.ocv_mismatch = Some(format!("{} / {}", s.text, c.text));
                }
            }
        }

        result.parameters =
            self.compare_parameters(&stored.report().parameters, &current.report().parameters);
        result.alarms = self.compare_alarms(&stored.report().alarms, &current.report().alarms);

        result
    }

    /// Compare two sets of sectors matched by name.
    ///
    /// Returns only non-empty differences. A sector present on one side only
    /// yields a single "sector missing" entry.
    pub fn compare_sector_sets(
        &self,
        stored: &[Sector],
        current: &[Sector],
    ) -> Vec<SectorDifferences> {
        let mut results = Vec::new();

        for s in stored {
            match current.iter().find(|c| c.name() == s.name()) {
                Some(c) => {
                    let diff = self.compare_sectors(s, c);
                    if diff.is_not_empty() {
                        results.push(diff);
                    }
                }
                None => {
                    let mut diff = SectorDifferences::new(s.name(), s.username());
                    diff.sector_missing = Some(format!("Sector '{}' missing from current", s.name()));
                    results.push(diff);
                }
            }
        }

        for c in current {
            if !stored.iter().any(|s| s.name() == c.name()) {
                let mut diff = SectorDifferences::new(c.name(), c.username());
                diff.sector_missing = Some(format!("Sector '{}' missing from stored", c.name()));
                results.push(diff);
            }
        }

        info!(
            "Compared {} stored and {} current sectors: {} with differences",
            stored.len(),
            current.len(),
            results.len()
        );

        results
    }
}
