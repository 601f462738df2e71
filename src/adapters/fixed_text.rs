//! Adapter for the fixed-text packet dialect.
//!
//! The device emits carriage-return delimited lines of the form
//! `Key,Value`. Graded measurements are `"<grade> <value>"`, warnings are
//! lines whose key starts with "Warning", and the overall grade may carry a
//! "DPM" marker.

use tracing::{debug, warn};

use crate::catalog::{Device, Parameter, ParameterCatalog, ParameterIdentity, Symbology, ValueKind};
use crate::error::AdapterError;
use crate::grade::Grade;
use crate::report::parse::{leading_number, parse_overall_grade, split_gs1_elements, try_leading_number};
use crate::report::{Alarm, Gs1Decode, Outcome, ParameterValue, Report, Units};
use crate::standards::{Gs1Table, Standard};
use crate::template::JobContext;

use super::{collect_parameters, iso_standard_for, ReportAdapter};

pub struct FixedText;

/// The `Key,Value` lines of one packet, in packet order.
#[derive(Debug)]
struct Packet {
    lines: Vec<(String, String)>,
}

impl Packet {
    fn parse(raw: &str) -> Self {
        let lines = raw
            .split(|c| c == '\r' || c == '\n')
            .map(|line| line.trim_matches(|c: char| c.is_control() || c.is_whitespace()))
            .filter(|line| !line.is_empty())
            .filter_map(|line| match line.split_once(',') {
                Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
                None => {
                    debug!("Ignoring line without a comma: '{}'", line);
                    None
                }
            })
            .collect();
        Self { lines }
    }

    /// Value for a key: an exact (case-insensitive) key match first, else a
    /// key that starts with `key` followed by a parenthesized or bracketed
    /// qualifier ("Symbol Contrast (SC)"). Empty values count as absent.
    fn get(&self, key: &str) -> Option<&str> {
        let wanted = key.to_lowercase();

        let exact = self
            .lines
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted);

        let found = exact.or_else(|| {
            self.lines.iter().find(|(k, _)| {
                let lower = k.to_lowercase();
                lower.starts_with(&wanted) && {
                    let rest = lower[wanted.len()..].trim_start();
                    rest.starts_with('(') || rest.starts_with('[') || rest.starts_with(':')
                }
            })
        });

        found
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    fn warnings(&self) -> impl Iterator<Item = Alarm> + '_ {
        self.lines
            .iter()
            .filter(|(k, _)| k.to_lowercase().starts_with("warning"))
            .map(|(k, v)| Alarm::warning(if v.is_empty() { k.as_str() } else { v.as_str() }))
    }
}

// --- Value conversion ---

fn read_measurement(identity: &ParameterIdentity, text: &str) -> Option<ParameterValue> {
    let parameter = identity.parameter;
    let tokens: Vec<&str> = text.split_whitespace().collect();

    match identity.kind {
        ValueKind::Grade => Some(ParameterValue::Grade {
            parameter,
            grade: Grade::new(leading_number(text)),
        }),
        ValueKind::GradeValue => match tokens.as_slice() {
            [] => None,
            [grade] => Some(ParameterValue::Grade {
                parameter,
                grade: Grade::new(leading_number(grade)),
            }),
            [grade, value, ..] => Some(ParameterValue::GradeValue {
                parameter,
                value: leading_number(value),
                grade: Grade::new(leading_number(grade)),
            }),
        },
        ValueKind::ValueDouble => Some(ParameterValue::ValueDouble {
            parameter,
            value: leading_number(text),
        }),
        ValueKind::ValueString => Some(ParameterValue::ValueString {
            parameter,
            value: text.to_string(),
        }),
        ValueKind::PassFail => Some(ParameterValue::PassFail {
            parameter,
            result: Outcome::from_label(text),
        }),
        ValueKind::ValuePassFail => {
            let result = Outcome::from_label(tokens.last()?);
            Some(match try_leading_number(tokens[0]) {
                Some(value) if tokens.len() > 1 => ParameterValue::ValuePassFail {
                    parameter,
                    value,
                    result,
                },
                _ => ParameterValue::PassFail { parameter, result },
            })
        }
        ValueKind::OverallGrade | ValueKind::Gs1Decode => None,
    }
}

/// X dimension with its unit: "10.2 mils", "0.254mm".
fn read_x_dimension(text: &str) -> (f64, Units) {
    let lower = text.to_lowercase();
    let units = if lower.trim_end().ends_with("mm") {
        Units::Millimeters
    } else if lower.contains("mil") {
        Units::Mils
    } else {
        warn!("Could not determine units from '{}', assuming mils", text);
        Units::Mils
    };
    (leading_number(text), units)
}

/// Aperture from "Reference number 12 (12 mil)".
fn read_aperture(text: &str) -> Option<f64> {
    let (_, inner) = text.split_once('(')?;
    try_leading_number(inner)
}

impl ReportAdapter for FixedText {
    fn device(&self) -> Device {
        Device::FixedText
    }

    fn parse_with_catalog(
        &self,
        catalog: &ParameterCatalog,
        raw: &str,
        _job: &JobContext,
        _desired_standard: Standard,
        _desired_table: Gs1Table,
    ) -> Result<Report, AdapterError> {
        let packet = Packet::parse(raw);
        if packet.lines.is_empty() {
            return Err(AdapterError::structural(
                Device::FixedText,
                "no Key,Value lines in packet",
            ));
        }

        let mut symbol_name = packet.get("Symbology").unwrap_or_default().to_string();
        if let Some(databar_type) = packet.get("DataBar type") {
            symbol_name = format!("DataBar {}", databar_type);
        }
        let symbology = Symbology::from_vendor_name(&symbol_name);
        if symbology == Symbology::Unknown {
            warn!("Could not determine symbology from '{}'", symbol_name);
        }

        let mut report = Report::new(Device::FixedText, symbology);
        report.decode_text = packet
            .get("Decoded text")
            .map(|text| text.replace('#', ""))
            .unwrap_or_default();

        match packet.get("Cell size").or_else(|| packet.get("Xdim")) {
            Some(text) => {
                let (x_dimension, units) = read_x_dimension(text);
                report.x_dimension = x_dimension;
                report.units = units;
            }
            None => debug!("No Cell size or Xdim line"),
        }

        let path_of = |parameter: Parameter| {
            catalog
                .lookup(parameter, Device::FixedText, symbology)
                .ok()
                .map(|identity| identity.path.as_str())
        };

        report.overall_grade = path_of(Parameter::OverallGrade)
            .and_then(|key| packet.get(key))
            .map(parse_overall_grade);

        report.aperture = packet
            .get("Aperture")
            .and_then(read_aperture)
            .or_else(|| {
                report
                    .overall_grade
                    .as_ref()
                    .and_then(|overall| try_leading_number(&overall.aperture))
            })
            .unwrap_or(0.0);

        let gs1_data = path_of(Parameter::Gs1Data).and_then(|key| packet.get(key));

        if let Some(data) = gs1_data {
            report.standard = Standard::Gs1;
            report.gs1_table = packet
                .get("GS1 Table")
                .map(Gs1Table::from_label)
                .unwrap_or(Gs1Table::Unsupported);
            report.gs1_decode = match packet.get("GS1 Data Structure") {
                Some(structure) => Some(Gs1Decode {
                    result: Outcome::from_label(structure),
                    input_text: report.decode_text.clone(),
                    formatted_output: data.to_string(),
                    fields: split_gs1_elements(data),
                    error: None,
                }),
                None => {
                    debug!("GS1 data without a structure check, leaving the decode unset");
                    None
                }
            };
        } else {
            report.standard = packet
                .get("Application standard")
                .or_else(|| packet.get("Grading standard"))
                .map(Standard::from_label)
                .unwrap_or_else(|| iso_standard_for(symbology));
        }

        report.alarms = packet.warnings().collect();

        collect_parameters(&mut report, catalog, |identity| {
            packet
                .get(&identity.path)
                .and_then(|text| read_measurement(identity, text))
        });

        debug!(
            "Parsed {} report: {} with {} parameters, {} alarms",
            Device::FixedText,
            report.symbology,
            report.parameters.len(),
            report.alarms.len()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Report, AdapterError> {
        FixedText.parse(raw, &JobContext::default(), Standard::None, Gs1Table::None)
    }

    #[test]
    fn test_packet_without_pairs_is_structural() {
        let err = parse("\r\nno commas here\r\n").unwrap_err();
        assert!(matches!(err, AdapterError::Structural { .. }), "got {:?}", err);
        assert!(parse("").is_err());
    }

    #[test]
    fn test_prefix_match_needs_qualifier() {
        let packet = Packet::parse("Symbol Contrast (SC),3.6 72\rGS1 Data Structure,PASS\r");
        assert_eq!(packet.get("Symbol Contrast"), Some("3.6 72"));
        assert_eq!(packet.get("symbol contrast (sc)"), Some("3.6 72"));
        assert_eq!(
            packet.get("GS1 Data"),
            None,
            "'GS1 Data Structure' must not answer for 'GS1 Data'"
        );
    }

    #[test]
    fn test_empty_value_is_absent() {
        let packet = Packet::parse("Modulation,\r");
        assert_eq!(packet.get("Modulation"), None);
    }

    #[test]
    fn test_grade_value_tokens() {
        let report = parse(
            "Symbology,Code 128\rSymbol Contrast,3.6 72\rModulation,2.0\rDefects,\r",
        )
        .unwrap();

        assert_eq!(
            report.parameters.get(Parameter::SymbolContrast),
            Some(&ParameterValue::GradeValue {
                parameter: Parameter::SymbolContrast,
                value: 72.0,
                grade: Grade::new(3.6)
            })
        );
        assert_eq!(
            report.parameters.get(Parameter::Modulation),
            Some(&ParameterValue::Grade {
                parameter: Parameter::Modulation,
                grade: Grade::new(2.0)
            })
        );
        assert!(report.parameters.get(Parameter::Defects).unwrap().is_missing());
    }

    #[test]
    fn test_value_pass_fail() {
        let report = parse("Symbology,UPC-A\rQuiet Zone,12 PASS\r").unwrap();
        assert_eq!(
            report.parameters.get(Parameter::QuietZone),
            Some(&ParameterValue::ValuePassFail {
                parameter: Parameter::QuietZone,
                value: 12.0,
                result: Outcome::Pass
            })
        );

        let report = parse("Symbology,UPC-A\rQuiet Zone,FAIL\r").unwrap();
        assert_eq!(
            report.parameters.get(Parameter::QuietZone),
            Some(&ParameterValue::PassFail {
                parameter: Parameter::QuietZone,
                result: Outcome::Fail
            })
        );
    }

    #[test]
    fn test_databar_type_joins_symbology() {
        let report = parse("Symbology,GS1 DataBar\rDataBar type,Expanded Stacked\r").unwrap();
        assert_eq!(report.symbology, Symbology::DataBarExpandedStacked);
    }

    #[test]
    fn test_x_dimension_units() {
        assert_eq!(read_x_dimension("10.2 mils"), (10.2, Units::Mils));
        assert_eq!(read_x_dimension("0.254mm"), (0.254, Units::Millimeters));
    }

    #[test]
    fn test_aperture_reference_number() {
        assert_eq!(read_aperture("Reference number 12 (12 mil)"), Some(12.0));
        assert_eq!(read_aperture("12 mil"), None);
    }

    #[test]
    fn test_warnings_become_alarms() {
        let report = parse("Symbology,Code 39\rWarning 1,Quiet zone violation\rWarning 2,\r").unwrap();
        assert_eq!(
            report.alarms,
            vec![Alarm::warning("Quiet zone violation"), Alarm::warning("Warning 2")]
        );
    }

    #[test]
    fn test_gs1_data_structure_result() {
        let report = parse(
            "Symbology,Data Matrix\rGS1 Data,(01)09521234543213(10)ABC\rGS1 Data Structure,PASS\rGS1 Table,Table 1\r",
        )
        .unwrap();
        assert_eq!(report.standard, Standard::Gs1);
        assert_eq!(report.gs1_table, Gs1Table::Table1);
        let gs1 = report.gs1_decode.as_ref().unwrap();
        assert_eq!(gs1.result, Outcome::Pass);
        assert_eq!(gs1.fields, vec!["(01)09521234543213", "(10)ABC"]);
    }

    #[test]
    fn test_gs1_data_without_structure_line_is_not_a_fail() {
        let report = parse("Symbology,Data Matrix\rGS1 Data,(01)09521234543213\r").unwrap();
        assert_eq!(report.standard, Standard::Gs1);
        assert!(report.gs1_decode.is_none());
        assert_eq!(
            report.parameters.get(Parameter::Gs1Data),
            Some(&ParameterValue::Missing {
                parameter: Parameter::Gs1Data
            })
        );
    }

    #[test]
    fn test_decoded_text_strips_hash() {
        let report = parse("Symbology,Code 128\rDecoded text,#ABC#123\r").unwrap();
        assert_eq!(report.decode_text, "ABC123");
    }
}
