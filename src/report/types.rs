//! Canonical report model produced by every adapter.
//!
//! Field names serialize in camelCase so stored sectors stay readable by
//! other tooling.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Device, Parameter, Symbology};
use crate::grade::{Grade, Letter};
use crate::standards::{Gs1Table, Standard};

// =============================================================================
// PARAMETER VALUES
// =============================================================================

/// Binary pass/fail outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    /// "PASS", "Pass", "passed" are a pass; everything else fails.
    pub fn from_label(label: &str) -> Outcome {
        if label.trim().to_uppercase().starts_with("PASS") {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    pub fn from_bool(passed: bool) -> Outcome {
        if passed {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("PASS"),
            Outcome::Fail => f.write_str("FAIL"),
        }
    }
}

/// Composite summary grade, e.g. "3.5/08/660".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallGrade {
    pub grade: Grade,
    /// The string exactly as the device reported it
    pub original: String,
    pub aperture: String,
    pub reference: String,
}

/// GS1 application-identifier decode outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gs1Decode {
    pub result: Outcome,
    pub input_text: String,
    pub formatted_output: String,
    /// One "(AI)data" element per application identifier
    pub fields: Vec<String>,
    pub error: Option<String>,
}

/// One sector parameter. A parameter is exactly one of these variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParameterValue {
    /// Parameter absent from the payload or unusable.
    Missing { parameter: Parameter },
    Grade { parameter: Parameter, grade: Grade },
    /// A raw measurement plus its grade.
    GradeValue {
        parameter: Parameter,
        value: f64,
        grade: Grade,
    },
    ValueDouble { parameter: Parameter, value: f64 },
    ValueString { parameter: Parameter, value: String },
    PassFail { parameter: Parameter, result: Outcome },
    ValuePassFail {
        parameter: Parameter,
        value: f64,
        result: Outcome,
    },
    OverallGrade(OverallGrade),
    Gs1Decode(Gs1Decode),
}

impl ParameterValue {
    pub fn parameter(&self) -> Parameter {
        match self {
            ParameterValue::Missing { parameter }
            | ParameterValue::Grade { parameter, .. }
            | ParameterValue::GradeValue { parameter, .. }
            | ParameterValue::ValueDouble { parameter, .. }
            | ParameterValue::ValueString { parameter, .. }
            | ParameterValue::PassFail { parameter, .. }
            | ParameterValue::ValuePassFail { parameter, .. } => *parameter,
            ParameterValue::OverallGrade(_) => Parameter::OverallGrade,
            ParameterValue::Gs1Decode(_) => Parameter::Gs1Data,
        }
    }

    /// The letter for graded variants.
    pub fn letter(&self) -> Option<Letter> {
        match self {
            ParameterValue::Grade { grade, .. } | ParameterValue::GradeValue { grade, .. } => {
                Some(grade.letter())
            }
            ParameterValue::OverallGrade(overall) => Some(overall.grade.letter()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ParameterValue::Missing { .. })
    }
}

/// Parameters of one sector, unique by name.
///
/// Kept sorted by `Parameter` so two sets built in different orders compare
/// and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ParameterValue>", into = "Vec<ParameterValue>")]
pub struct ParameterSet(Vec<ParameterValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing entry for the same parameter.
    pub fn insert(&mut self, value: ParameterValue) {
        match self
            .0
            .binary_search_by_key(&value.parameter(), |v| v.parameter())
        {
            Ok(idx) => self.0[idx] = value,
            Err(idx) => self.0.insert(idx, value),
        }
    }

    pub fn get(&self, parameter: Parameter) -> Option<&ParameterValue> {
        self.0
            .binary_search_by_key(&parameter, |v| v.parameter())
            .ok()
            .map(|idx| &self.0[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ParameterValue>> for ParameterSet {
    fn from(values: Vec<ParameterValue>) -> Self {
        values.into_iter().collect()
    }
}

impl From<ParameterSet> for Vec<ParameterValue> {
    fn from(set: ParameterSet) -> Self {
        set.0
    }
}

impl FromIterator<ParameterValue> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = ParameterValue>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a ParameterValue;
    type IntoIter = std::slice::Iter<'a, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// ALARMS
// =============================================================================

/// Alarm severity. Serialized as the device's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AlarmCategory {
    Warning = 1,
    Error = 2,
}

impl From<AlarmCategory> for u8 {
    fn from(category: AlarmCategory) -> Self {
        category as u8
    }
}

impl TryFrom<u8> for AlarmCategory {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, String> {
        match code {
            1 => Ok(AlarmCategory::Warning),
            2 => Ok(AlarmCategory::Error),
            other => Err(format!("unknown alarm category {}", other)),
        }
    }
}

/// Optional detail attached to an alarm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAlarm {
    pub index: u32,
    pub expected: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub category: AlarmCategory,
    pub name: String,
    pub detail: Option<SubAlarm>,
}

impl Alarm {
    pub fn warning(name: impl Into<String>) -> Self {
        Self {
            category: AlarmCategory::Warning,
            name: name.into(),
            detail: None,
        }
    }

    pub fn error(name: impl Into<String>) -> Self {
        Self {
            category: AlarmCategory::Error,
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: SubAlarm) -> Self {
        self.detail = Some(detail);
        self
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Unit of `Report::x_dimension`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Mils,
    Millimeters,
    Pixels,
}

impl Units {
    pub fn from_label(label: &str) -> Units {
        let lower = label.trim().to_lowercase();
        if lower.contains("mm") || lower.contains("milli") {
            Units::Millimeters
        } else if lower.starts_with("pix") || lower == "px" {
            Units::Pixels
        } else {
            Units::Mils
        }
    }
}

/// Extended 2-D module measurements (matrix codes only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleData {
    pub module_modulation: Vec<i32>,
    pub module_reflectance: Vec<i32>,
    pub quiet_zone: i32,
    pub num_rows: i32,
    pub num_columns: i32,
    pub cos_angle0: f64,
    pub cos_angle1: f64,
    pub sin_angle0: f64,
    pub sin_angle1: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub xne: f64,
    pub yne: f64,
    pub xnw: f64,
    pub ynw: f64,
    pub xsw: f64,
    pub ysw: f64,
}

/// OCR/OCV read-back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    pub text: String,
    pub score: f64,
}

/// Canonical inspection report for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub device: Device,
    pub symbology: Symbology,
    pub decode_text: String,
    pub x_dimension: f64,
    pub aperture: f64,
    pub units: Units,
    pub overall_grade: Option<OverallGrade>,
    /// Standard the device actually graded against
    pub standard: Standard,
    pub gs1_table: Gs1Table,
    pub parameters: ParameterSet,
    pub alarms: Vec<Alarm>,
    pub gs1_decode: Option<Gs1Decode>,
    pub module_data: Option<ModuleData>,
    pub ocr: Option<OcrResult>,
    pub blemish_count: Option<u32>,
}

impl Report {
    /// An empty report for a device; adapters fill it in.
    pub fn new(device: Device, symbology: Symbology) -> Self {
        Self {
            device,
            symbology,
            decode_text: String::new(),
            x_dimension: 0.0,
            aperture: 0.0,
            units: Units::Mils,
            overall_grade: None,
            standard: Standard::None,
            gs1_table: Gs1Table::None,
            parameters: ParameterSet::new(),
            alarms: Vec::new(),
            gs1_decode: None,
            module_data: None,
            ocr: None,
            blemish_count: None,
        }
    }

    /// Highest alarm category, if any alarm is present.
    pub fn highest_alarm(&self) -> Option<AlarmCategory> {
        self.alarms.iter().map(|a| a.category).max()
    }
}
