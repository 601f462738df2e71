pub mod adapters;
pub mod catalog;
pub mod diff;
mod error;
pub mod grade;
pub mod report;
pub mod sector;
pub mod standards;
pub mod template;

pub use adapters::{adapter_for, all_adapters, ReportAdapter};
pub use diff::{compare, compare_sector_sets, DiffEngine, DiffSettings, SectorDifferences};
pub use error::{AdapterError, CatalogError};
pub use grade::{letter_for, Grade, Letter};
pub use report::{ParameterSet, ParameterValue, Report};
pub use sector::{Sector, Severity};

/// Install the `tracing` subscriber used by the command-line tool.
///
/// Honors `RUST_LOG`, falling back to `info`. Library callers install their
/// own subscriber instead.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
