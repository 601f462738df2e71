//! Device report adapters.
//!
//! Each adapter turns one device's raw output into a canonical [`Report`].
//! They share the parameter catalog, the grade bucketer and the lenient
//! field parsers; only the envelope shape and node layout differ.
//!
//! # Example
//!
//! ```ignore
//! use sectorval::adapters::adapter_for;
//! use sectorval::catalog::Device;
//! use sectorval::standards::{Gs1Table, Standard};
//! use sectorval::template::JobContext;
//!
//! let adapter = adapter_for(Device::FixedText);
//! let report = adapter.parse(&packet, &JobContext::default(), Standard::Iso15416, Gs1Table::None)?;
//! ```

mod fixed_text;
mod json_alt;
mod json_rich;

pub use fixed_text::FixedText;
pub use json_alt::JsonAlt;
pub use json_rich::JsonRich;

use tracing::debug;

use crate::catalog::{Device, Family, ParameterCatalog, ParameterIdentity, Symbology, ValueKind};
use crate::error::AdapterError;
use crate::report::{ParameterValue, Report};
use crate::standards::{Gs1Table, Standard};
use crate::template::{JobContext, Template};

/// A parser for one device's report dialect.
pub trait ReportAdapter: Send + Sync {
    /// The device this adapter understands.
    fn device(&self) -> Device;

    /// Parse a raw payload using an explicit catalog.
    fn parse_with_catalog(
        &self,
        catalog: &ParameterCatalog,
        raw: &str,
        job: &JobContext,
        desired_standard: Standard,
        desired_table: Gs1Table,
    ) -> Result<Report, AdapterError>;

    /// Parse a raw payload using the process-wide catalog.
    fn parse(
        &self,
        raw: &str,
        job: &JobContext,
        desired_standard: Standard,
        desired_table: Gs1Table,
    ) -> Result<Report, AdapterError> {
        self.parse_with_catalog(
            ParameterCatalog::global(),
            raw,
            job,
            desired_standard,
            desired_table,
        )
    }

    /// Build the sector template for this read.
    fn template(&self, job: &JobContext) -> Template {
        Template::from_job(job)
    }
}

/// Return instances of all registered adapters.
pub fn all_adapters() -> Vec<Box<dyn ReportAdapter>> {
    vec![Box::new(JsonRich), Box::new(JsonAlt), Box::new(FixedText)]
}

/// The adapter for a device.
pub fn adapter_for(device: Device) -> Box<dyn ReportAdapter> {
    match device {
        Device::JsonRich => Box::new(JsonRich),
        Device::JsonAlt => Box::new(JsonAlt),
        Device::FixedText => Box::new(FixedText),
    }
}

/// ISO standard implied by a symbology when the payload does not name one.
fn iso_standard_for(symbology: Symbology) -> Standard {
    match symbology.family() {
        Family::Linear => Standard::Iso15416,
        Family::Stacked | Family::Matrix => Standard::Iso15415,
        Family::Ocr | Family::Blemish | Family::Unknown => Standard::None,
    }
}

/// Fill `report.parameters` with every catalog parameter for its
/// device/symbology.
///
/// Overall grade and GS1 entries are taken from the report itself; `read`
/// supplies everything else. Anything `read` cannot produce is recorded as
/// `Missing`. GS1-only parameters are skipped unless the report was graded
/// against GS1.
fn collect_parameters<F>(report: &mut Report, catalog: &ParameterCatalog, mut read: F)
where
    F: FnMut(&ParameterIdentity) -> Option<ParameterValue>,
{
    for identity in catalog.parameters_for(report.device, report.symbology) {
        if identity.gs1_only && report.standard != Standard::Gs1 {
            continue;
        }

        let value = match identity.kind {
            ValueKind::OverallGrade => report
                .overall_grade
                .clone()
                .map(ParameterValue::OverallGrade),
            ValueKind::Gs1Decode => report.gs1_decode.clone().map(ParameterValue::Gs1Decode),
            _ => read(identity),
        };

        match value {
            Some(value) => report.parameters.insert(value),
            None => {
                debug!(
                    "Parameter '{}' @ '{}' missing or unparsable ({})",
                    identity.parameter, identity.path, report.device
                );
                report.parameters.insert(ParameterValue::Missing {
                    parameter: identity.parameter,
                });
            }
        }
    }
}
