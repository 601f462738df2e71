//! Adapter for the nested JSON report dialect.
//!
//! Reports arrive as `{"type": ..., "data": {...}}`. Graded measurements
//! are `{value, grade: {value, letter}}` objects, pass/fail measurements are
//! `{value, result}`, and alarms, GS1 results and 2-D module data hang off
//! `data` directly.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::catalog::{Device, Family, Parameter, ParameterCatalog, ParameterIdentity, Symbology, ValueKind};
use crate::error::AdapterError;
use crate::grade::Grade;
use crate::report::parse::{number_value, parse_overall_grade, text_value, value_at};
use crate::report::{
    Alarm, AlarmCategory, Gs1Decode, ModuleData, OcrResult, Outcome, OverallGrade, ParameterValue,
    Report, SubAlarm, Units,
};
use crate::standards::{Gs1Table, Standard};
use crate::template::JobContext;

use super::{collect_parameters, iso_standard_for, ReportAdapter};

pub struct JsonRich;

// --- Payload structure ---

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GradeNode {
    value: Option<Value>,
}

/// Any measurement node; which fields matter depends on the catalog kind.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MeasurementNode {
    value: Option<Value>,
    grade: Option<GradeNode>,
    result: Option<String>,
}

impl MeasurementNode {
    fn from_value(node: &Value, parameter: Parameter) -> Option<Self> {
        match node {
            Value::Object(_) => match serde_json::from_value(node.clone()) {
                Ok(measurement) => Some(measurement),
                Err(e) => {
                    warn!("Malformed '{}' node: {}", parameter, e);
                    None
                }
            },
            Value::String(s) => Some(Self {
                value: Some(node.clone()),
                grade: None,
                result: Some(s.clone()),
            }),
            scalar => Some(Self {
                value: Some(scalar.clone()),
                ..Self::default()
            }),
        }
    }

    fn value_number(&self) -> Option<f64> {
        self.value.as_ref().and_then(number_value)
    }

    fn grade_number(&self) -> Option<f64> {
        self.grade
            .as_ref()
            .and_then(|g| g.value.as_ref())
            .and_then(number_value)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OverallNode {
    string: Option<String>,
    grade: Option<GradeNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Gs1ResultsNode {
    validated: bool,
    input: String,
    formatted_out: String,
    fields: Map<String, Value>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlarmNode {
    category: u8,
    name: String,
    #[serde(default)]
    data: Option<AlarmDataNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AlarmDataNode {
    sub_alarm: u32,
    expected: Option<Value>,
    text: Option<String>,
}

// --- Node conversion ---

fn read_measurement(identity: &ParameterIdentity, node: &Value) -> Option<ParameterValue> {
    let parameter = identity.parameter;
    let m = MeasurementNode::from_value(node, parameter)?;

    match identity.kind {
        ValueKind::Grade => m
            .grade_number()
            .or_else(|| m.value_number())
            .map(|g| ParameterValue::Grade {
                parameter,
                grade: Grade::new(g),
            }),
        ValueKind::GradeValue => match (m.value_number(), m.grade_number()) {
            (Some(value), Some(grade)) => Some(ParameterValue::GradeValue {
                parameter,
                value,
                grade: Grade::new(grade),
            }),
            (Some(g), None) | (None, Some(g)) => Some(ParameterValue::Grade {
                parameter,
                grade: Grade::new(g),
            }),
            (None, None) => None,
        },
        ValueKind::ValueDouble => m
            .value_number()
            .map(|value| ParameterValue::ValueDouble { parameter, value }),
        ValueKind::ValueString => m
            .value
            .as_ref()
            .and_then(text_value)
            .map(|value| ParameterValue::ValueString { parameter, value }),
        ValueKind::PassFail => m.result.as_deref().map(|r| ParameterValue::PassFail {
            parameter,
            result: Outcome::from_label(r),
        }),
        ValueKind::ValuePassFail => {
            let result = Outcome::from_label(m.result.as_deref()?);
            Some(match m.value_number() {
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
    if let Value::String(s) = node {
        return Some(parse_overall_grade(s));
    }

    let parsed: OverallNode = match serde_json::from_value(node.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Malformed overall grade node: {}", e);
            return None;
        }
    };

    let mut overall = parse_overall_grade(parsed.string.as_deref()?);
    if let Some(grade) = parsed
        .grade
        .and_then(|g| g.value)
        .as_ref()
        .and_then(number_value)
    {
        overall.grade = Grade::new(grade);
    }
    Some(overall)
}

fn read_gs1(node: &Value, decode_text: &str) -> Option<Gs1Decode> {
    let parsed: Gs1ResultsNode = match serde_json::from_value(node.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Malformed GS1 results node: {}", e);
            return None;
        }
    };

    let fields = parsed
        .fields
        .iter()
        .map(|(ai, data)| format!("({}){}", ai, text_value(data).unwrap_or_default()))
        .collect();

    Some(Gs1Decode {
        result: Outcome::from_bool(parsed.validated),
        input_text: if parsed.input.is_empty() {
            decode_text.to_string()
        } else {
            parsed.input
        },
        formatted_output: parsed.formatted_out,
        fields,
        error: parsed.error.filter(|e| !e.is_empty()),
    })
}

fn read_alarms(data: &Value) -> Vec<Alarm> {
    let Some(nodes) = data.get("alarms").and_then(Value::as_array) else {
        return Vec::new();
    };

    nodes
        .iter()
        .filter_map(|node| {
            let parsed: AlarmNode = match serde_json::from_value(node.clone()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Skipping malformed alarm: {}", e);
                    return None;
                }
            };
            let category = match AlarmCategory::try_from(parsed.category) {
                Ok(category) => category,
                Err(e) => {
                    warn!("Skipping alarm '{}': {}", parsed.name, e);
                    return None;
                }
            };
            Some(Alarm {
                category,
                name: parsed.name,
                detail: parsed.data.map(|d| SubAlarm {
                    index: d.sub_alarm,
                    expected: d.expected.as_ref().and_then(text_value),
                    text: d.text,
                }),
            })
        })
        .collect()
}

impl ReportAdapter for JsonRich {
    fn device(&self) -> Device {
        Device::JsonRich
    }

    fn parse_with_catalog(
        &self,
        catalog: &ParameterCatalog,
        raw: &str,
        job: &JobContext,
        _desired_standard: Standard,
        _desired_table: Gs1Table,
    ) -> Result<Report, AdapterError> {
        let envelope: Envelope = serde_json::from_str(raw).map_err(|source| AdapterError::Json {
            device: Device::JsonRich,
            source,
        })?;

        let data = match envelope.data {
            Some(data @ Value::Object(_)) => data,
            _ => {
                return Err(AdapterError::structural(
                    Device::JsonRich,
                    "missing `data` report object",
                ))
            }
        };

        let symbol_type = data.get("symbolType").and_then(text_value).unwrap_or_default();
        let symbology = Symbology::from_vendor_name(&symbol_type);
        if symbology == Symbology::Unknown {
            warn!("Could not determine symbology from '{}'", symbol_type);
        }

        let mut report = Report::new(Device::JsonRich, symbology);
        report.decode_text = data.get("decodeText").and_then(text_value).unwrap_or_default();
        report.x_dimension = data.get("xDimension").and_then(number_value).unwrap_or(0.0);
        report.aperture = data.get("aperture").and_then(number_value).unwrap_or(0.0);
        report.units = data
            .get("lengthUnit")
            .and_then(Value::as_str)
            .map(Units::from_label)
            .unwrap_or(Units::Mils);

        let path_of = |parameter: Parameter| {
            catalog
                .lookup(parameter, Device::JsonRich, symbology)
                .ok()
                .map(|identity| identity.path.as_str())
        };

        report.overall_grade = path_of(Parameter::OverallGrade)
            .and_then(|path| value_at(&data, path))
            .and_then(read_overall);

        let gs1_node = path_of(Parameter::Gs1Data).and_then(|path| value_at(&data, path));
        report.gs1_decode = gs1_node.and_then(|node| read_gs1(node, &report.decode_text));

        if gs1_node.is_some() || job.gs1_enabled() {
            report.standard = Standard::Gs1;
            report.gs1_table = job
                .gs1_table_id()
                .map(|id| Gs1Table::from_label(&id))
                .unwrap_or(Gs1Table::Unsupported);
        } else {
            report.standard = iso_standard_for(symbology);
        }

        report.alarms = read_alarms(&data);

        report.module_data = data.get("extendedData").and_then(|node| {
            serde_json::from_value::<ModuleData>(node.clone())
                .map_err(|e| warn!("Malformed extended module data: {}", e))
                .ok()
        });

        match symbology.family() {
            Family::Ocr => {
                report.ocr = Some(OcrResult {
                    text: data.get("text").and_then(text_value).unwrap_or_default(),
                    score: data.get("score").and_then(number_value).unwrap_or(0.0),
                });
            }
            Family::Blemish => {
                report.blemish_count = data
                    .get("blemishCount")
                    .and_then(Value::as_u64)
                    .and_then(|n| match u32::try_from(n) {
                        Ok(count) => Some(count),
                        Err(_) => {
                            warn!("Blemish count {} out of range", n);
                            None
                        }
                    });
            }
            _ => {}
        }

        collect_parameters(&mut report, catalog, |identity| {
            value_at(&data, &identity.path).and_then(|node| read_measurement(identity, node))
        });

        debug!(
            "Parsed {} report: {} with {} parameters, {} alarms",
            Device::JsonRich,
            report.symbology,
            report.parameters.len(),
            report.alarms.len()
        );

        Ok(report)
    }
}
