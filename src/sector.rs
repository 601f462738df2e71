//! One graded symbol region: its template, its report and the operator's
//! expected grading standard.

use serde::{Deserialize, Serialize};

use crate::adapters::ReportAdapter;
use crate::catalog::Symbology;
use crate::error::AdapterError;
use crate::report::{AlarmCategory, Report};
use crate::standards::{is_wrong_standard, Gs1Table, Standard};
use crate::template::{JobContext, Template};

/// Highest alarm category raised for a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    None,
    Warning,
    Error,
}

impl From<Option<AlarmCategory>> for Severity {
    fn from(category: Option<AlarmCategory>) -> Self {
        match category {
            None => Severity::None,
            Some(AlarmCategory::Warning) => Severity::Warning,
            Some(AlarmCategory::Error) => Severity::Error,
        }
    }
}

/// A sector, immutable once built.
///
/// `is_wrong_standard` and `severity` are derived on construction and again
/// on deserialization, so a persisted sector can never carry stale flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SectorRecord")]
pub struct Sector {
    template: Template,
    report: Report,
    desired_standard: Standard,
    desired_table: Gs1Table,
    is_wrong_standard: bool,
    severity: Severity,
}

/// The persisted inputs of a sector.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectorRecord {
    template: Template,
    report: Report,
    desired_standard: Standard,
    desired_table: Gs1Table,
}

impl From<SectorRecord> for Sector {
    fn from(record: SectorRecord) -> Self {
        Sector::new(
            record.template,
            record.report,
            record.desired_standard,
            record.desired_table,
        )
    }
}

impl Sector {
    pub fn new(
        template: Template,
        report: Report,
        desired_standard: Standard,
        desired_table: Gs1Table,
    ) -> Self {
        let is_wrong_standard = is_wrong_standard(
            desired_standard,
            desired_table,
            report.standard,
            report.gs1_table,
        );
        let severity = Severity::from(report.highest_alarm());

        Self {
            template,
            report,
            desired_standard,
            desired_table,
            is_wrong_standard,
            severity,
        }
    }

    /// Parse a raw device payload and wrap it with its template.
    pub fn from_payload(
        adapter: &dyn ReportAdapter,
        raw: &str,
        job: &JobContext,
        desired_standard: Standard,
        desired_table: Gs1Table,
    ) -> Result<Self, AdapterError> {
        let report = adapter.parse(raw, job, desired_standard, desired_table)?;
        let template = adapter.template(job);
        Ok(Self::new(template, report, desired_standard, desired_table))
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn username(&self) -> &str {
        &self.template.username
    }

    pub fn symbology(&self) -> Symbology {
        self.report.symbology
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn desired_standard(&self) -> Standard {
        self.desired_standard
    }

    pub fn desired_table(&self) -> Gs1Table {
        self.desired_table
    }

    pub fn is_wrong_standard(&self) -> bool {
        self.is_wrong_standard
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
