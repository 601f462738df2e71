//! Adapter for the flat JSON report dialect.
//!
//! The payload root carries a `read` flag, a `grading` section with one
//! object per ISO standard, symbology-specific sections ("Datamatrix",
//! "QR", ...) and the GS1 result. Grade nodes are `{grade, letter, value}`
//! where `letter` is a character code; letters are always re-derived from
//! the numeric grade.
//!
//! The device never reports which GS1 table it graded against, so when GS1
//! is enabled the actual table is taken to be the desired one.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{Device, Parameter, ParameterCatalog, ParameterIdentity, Symbology, ValueKind};
use crate::error::AdapterError;
use crate::grade::Grade;
use crate::report::parse::{
    number_value, parse_overall_grade, split_gs1_elements, text_value, try_leading_number, value_at,
};
use crate::report::{Alarm, Gs1Decode, OverallGrade, Outcome, ParameterValue, Report, SubAlarm, Units};
use crate::standards::{Gs1Table, Standard};
use crate::template::JobContext;

use super::{collect_parameters, iso_standard_for, ReportAdapter};

/// Character code the device uses for a passing letter.
const LETTER_A: u32 = 65;

pub struct JsonAlt;

// --- Payload structure ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    read: bool,
    #[serde(default)]
    symbol_type: Option<Value>,
    #[serde(default)]
    decoded_text: Option<Value>,
    #[serde(default)]
    ppe: Option<Value>,
    #[serde(default)]
    gs1_enabled: Option<Value>,
}

impl Envelope {
    fn gs1_enabled(&self) -> bool {
        match &self.gs1_enabled {
            None => false,
            Some(Value::Bool(enabled)) => *enabled,
            Some(other) => {
                warn!("Ignoring non-boolean gs1Enabled: {}", other);
                false
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GradingNode {
    grade: Option<Value>,
    letter: Option<u32>,
    value: Option<Value>,
    result: Option<String>,
}

impl GradingNode {
    fn from_value(node: &Value, parameter: Parameter) -> Option<Self> {
        match node {
            Value::Object(_) => match serde_json::from_value(node.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Malformed '{}' node: {}", parameter, e);
                    None
                }
            },
            Value::Bool(passed) => Some(Self {
                result: Some(Outcome::from_bool(*passed).to_string()),
                ..Self::default()
            }),
            Value::String(s) => Some(Self {
                value: Some(node.clone()),
                result: Some(s.clone()),
                ..Self::default()
            }),
            scalar => Some(Self {
                value: Some(scalar.clone()),
                ..Self::default()
            }),
        }
    }

    fn grade_number(&self) -> Option<f64> {
        self.grade.as_ref().and_then(number_value)
    }

    fn value_number(&self) -> Option<f64> {
        self.value.as_ref().and_then(number_value)
    }

    /// Explicit result string, else a passing letter code.
    fn outcome(&self) -> Option<Outcome> {
        match (&self.result, self.letter) {
            (Some(result), _) => Some(Outcome::from_label(result)),
            (None, Some(letter)) => Some(Outcome::from_bool(letter == LETTER_A)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Gs1Node {
    data: String,
    validated: bool,
    formatted_out: String,
}

// --- Node conversion ---

fn read_measurement(identity: &ParameterIdentity, node: &Value) -> Option<ParameterValue> {
    let parameter = identity.parameter;
    let n = GradingNode::from_value(node, parameter)?;

    match identity.kind {
        ValueKind::Grade => n
            .grade_number()
            .or_else(|| n.value_number())
            .map(|g| ParameterValue::Grade {
                parameter,
                grade: Grade::new(g),
            }),
        ValueKind::GradeValue => match (n.value_number(), n.grade_number()) {
            (Some(value), Some(grade)) => Some(ParameterValue::GradeValue {
                parameter,
                value,
                grade: Grade::new(grade),
            }),
            (None, Some(grade)) => Some(ParameterValue::Grade {
                parameter,
                grade: Grade::new(grade),
            }),
            _ => None,
        },
        ValueKind::ValueDouble => n
            .value_number()
            .map(|value| ParameterValue::ValueDouble { parameter, value }),
        ValueKind::ValueString => n
            .value
            .as_ref()
            .and_then(text_value)
            .map(|value| ParameterValue::ValueString { parameter, value }),
        ValueKind::PassFail => n
            .outcome()
            .map(|result| ParameterValue::PassFail { parameter, result }),
        ValueKind::ValuePassFail => {
            let result = n.outcome()?;
            Some(match n.value_number() {
                Some(value) => ParameterValue::ValuePassFail {
                    parameter,
                    value,
                    result,
                },
                None => ParameterValue::PassFail { parameter, result },
            })
        }
        ValueKind::OverallGrade | ValueKind::Gs1Decode => None,
    }
}

fn read_overall(node: &Value) -> Option<OverallGrade> {
    match node {
        Value::String(s) => Some(parse_overall_grade(s)),
        Value::Object(_) => {
            let original = node.get("string").and_then(Value::as_str)?;
            let mut overall = parse_overall_grade(original);
            if let Some(grade) = node.get("grade").and_then(number_value) {
                overall.grade = Grade::new(grade);
            }
            Some(overall)
        }
        _ => {
            warn!("Malformed overall grade node");
            None
        }
    }
}

/// ISO standard from the job's per-standard switches.
fn job_iso_standard(job: &JobContext) -> Option<Standard> {
    match (
        job.flag("iso15415.enabled"),
        job.flag("iso15416.enabled"),
        job.flag("iso29158.enabled"),
    ) {
        (true, true, _) => Some(Standard::Iso15415And15416),
        (true, false, _) => Some(Standard::Iso15415),
        (false, true, _) => Some(Standard::Iso15416),
        (false, false, true) => Some(Standard::Iso29158),
        (false, false, false) => None,
    }
}

impl ReportAdapter for JsonAlt {
    fn device(&self) -> Device {
        Device::JsonAlt
    }

    fn parse_with_catalog(
        &self,
        catalog: &ParameterCatalog,
        raw: &str,
        job: &JobContext,
        _desired_standard: Standard,
        desired_table: Gs1Table,
    ) -> Result<Report, AdapterError> {
        let root: Value = serde_json::from_str(raw).map_err(|source| AdapterError::Json {
            device: Device::JsonAlt,
            source,
        })?;

        if !root.is_object() {
            return Err(AdapterError::structural(Device::JsonAlt, "payload is not an object"));
        }
        let envelope: Envelope = serde_json::from_value(root.clone()).map_err(|e| {
            AdapterError::structural(Device::JsonAlt, format!("missing boolean `read`: {}", e))
        })?;

        if !envelope.read {
            info!("Device reported a failed read");
            let mut report = Report::new(Device::JsonAlt, Symbology::Unknown);
            report.alarms.push(Alarm::error("Read failed"));
            return Ok(report);
        }

        let symbol_type = envelope
            .symbol_type
            .as_ref()
            .and_then(text_value)
            .unwrap_or_default();
        let symbology = Symbology::from_vendor_name(&symbol_type);
        if symbology == Symbology::Unknown {
            warn!("Could not determine symbology from '{}'", symbol_type);
        }

        let mut report = Report::new(Device::JsonAlt, symbology);
        report.decode_text = envelope
            .decoded_text
            .as_ref()
            .and_then(text_value)
            .unwrap_or_default();

        let ppe = envelope.ppe.as_ref().and_then(number_value).unwrap_or(0.0);
        match job.ppi() {
            Some(ppi) => {
                report.x_dimension = ppe * 1000.0 / ppi;
                report.units = Units::Mils;
            }
            None => {
                debug!("No ppi in job, reporting X dimension in pixels");
                report.x_dimension = ppe;
                report.units = Units::Pixels;
            }
        }

        let path_of = |parameter: Parameter| {
            catalog
                .lookup(parameter, Device::JsonAlt, symbology)
                .ok()
                .map(|identity| identity.path.as_str())
        };

        report.overall_grade = path_of(Parameter::OverallGrade)
            .and_then(|path| value_at(&root, path))
            .and_then(read_overall);

        report.aperture = report
            .overall_grade
            .as_ref()
            .and_then(|overall| try_leading_number(&overall.aperture))
            .unwrap_or(0.0);

        let gs1_node = path_of(Parameter::Gs1Data).and_then(|path| value_at(&root, path));

        if envelope.gs1_enabled() || gs1_node.is_some() {
            report.standard = Standard::Gs1;
            report.gs1_table = desired_table;
        } else {
            report.standard = job_iso_standard(job).unwrap_or_else(|| iso_standard_for(symbology));
        }

        if let Some(node) = gs1_node {
            match serde_json::from_value::<Gs1Node>(node.clone()) {
                Ok(gs1) => {
                    let formatted = if gs1.formatted_out.is_empty() {
                        gs1.data.clone()
                    } else {
                        gs1.formatted_out
                    };
                    if !gs1.validated {
                        report.alarms.push(Alarm::error("GS1 data structure").with_detail(SubAlarm {
                            index: 0,
                            expected: None,
                            text: Some(formatted.clone()),
                        }));
                    }
                    report.gs1_decode = Some(Gs1Decode {
                        result: Outcome::from_bool(gs1.validated),
                        input_text: report.decode_text.clone(),
                        formatted_output: formatted,
                        fields: if gs1.validated {
                            split_gs1_elements(&gs1.data)
                        } else {
                            Vec::new()
                        },
                        error: None,
                    });
                }
                Err(e) => warn!("Malformed GS1 node: {}", e),
            }
        }

        collect_parameters(&mut report, catalog, |identity| {
            value_at(&root, &identity.path).and_then(|node| read_measurement(identity, node))
        });

        debug!(
            "Parsed {} report: {} with {} parameters, {} alarms",
            Device::JsonAlt,
            report.symbology,
            report.parameters.len(),
            report.alarms.len()
        );

        Ok(report)
    }
}
