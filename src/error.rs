use thiserror::Error;

use crate::catalog::{Device, Parameter, Symbology};

/// Hard adapter failure: the payload is not a report of the expected device.
///
/// Missing or malformed individual fields never produce this error; they
/// degrade to `Missing` entries or zero sentinels instead.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{device} payload is not a report: {reason}")]
    Structural { device: Device, reason: String },

    #[error("{device} payload is not valid JSON: {source}")]
    Json {
        device: Device,
        #[source]
        source: serde_json::Error,
    },
}

impl AdapterError {
    pub fn structural(device: Device, reason: impl Into<String>) -> Self {
        AdapterError::Structural {
            device,
            reason: reason.into(),
        }
    }
}

/// A parameter is not defined for a device/symbology combination.
///
/// Adapters treat this as "not applicable" and skip the parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("parameter '{parameter}' is not defined for {device} / {symbology}")]
    NotFound {
        parameter: Parameter,
        device: Device,
        symbology: Symbology,
    },
}
