//! Differencing results.

use serde::{Deserialize, Serialize};

use crate::catalog::Symbology;
use crate::report::{Alarm, ParameterValue};

/// Two name-matched sectors report different symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbologyMismatch {
    pub stored: Symbology,
    pub current: Symbology,
}

/// Sparse difference between a stored and a current sector.
///
/// Holds copies of the differing entries only. Collections are always
/// present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorDifferences {
    pub name: String,
    pub username: String,
    /// Current values that differ, or stored values with no current counterpart
    pub parameters: Vec<ParameterValue>,
    pub alarms: Vec<Alarm>,
    /// "stored / current" when OCR/OCV text differs
    pub ocv_mismatch: Option<String>,
    pub sector_missing: Option<String>,
    pub symbology_mismatch: Option<SymbologyMismatch>,
}

impl SectorDifferences {
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    /// Whether any difference was recorded.
    pub fn is_not_empty(&self) -> bool {
        !self.parameters.is_empty()
            || !self.alarms.is_empty()
            || self.ocv_mismatch.is_some()
            || self.sector_missing.is_some()
            || self.symbology_mismatch.is_some()
    }

    pub fn is_not_ocv_match(&self) -> bool {
        self.ocv_mismatch.is_some()
    }

    pub fn is_sector_missing(&self) -> bool {
        self.sector_missing.is_some()
    }
}
