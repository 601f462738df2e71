//! Catalog loading and lookup.
//!
//! Provides two loading methods:
//! - `default_catalog()` - Loads the catalog compiled into the binary
//! - `load_catalog(path)` - Loads a custom catalog from a file path

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::CatalogError;

use super::types::{Device, Family, Parameter, Symbology, ValueKind};

/// Default catalog embedded in the binary at compile time.
const DEFAULT_CATALOG: &str = include_str!("../../config/parameter_catalog.toml");

static GLOBAL: OnceLock<ParameterCatalog> = OnceLock::new();

// =============================================================================
// CONFIGURATION TYPES (loaded from TOML)
// =============================================================================

/// Root of parameter_catalog.toml: one entry list per device.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub json_rich: Vec<EntryConfig>,
    #[serde(default)]
    pub json_alt: Vec<EntryConfig>,
    #[serde(default)]
    pub fixed_text: Vec<EntryConfig>,
}

/// One catalog line.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    pub name: Parameter,
    /// Restricts the entry to one symbology
    #[serde(default)]
    pub symbology: Option<Symbology>,
    /// Restricts the entry to the listed families (ignored when `symbology` is set)
    #[serde(default)]
    pub families: Vec<Family>,
    /// Dotted JSON path or fixed-text line key
    pub path: String,
    pub kind: ValueKind,
    #[serde(default)]
    pub gs1_only: bool,
}

// =============================================================================
// RUNTIME TYPES
// =============================================================================

/// Where a parameter lives in one device's report and what it decodes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterIdentity {
    pub parameter: Parameter,
    pub device: Device,
    pub path: String,
    pub kind: ValueKind,
    pub gs1_only: bool,
}

#[derive(Debug, Clone)]
enum Scope {
    Symbology(Symbology),
    Families(Vec<Family>),
    Any,
}

impl Scope {
    fn matches(&self, symbology: Symbology) -> bool {
        match self {
            Scope::Symbology(s) => *s == symbology,
            Scope::Families(families) => families.contains(&symbology.family()),
            Scope::Any => true,
        }
    }

    fn specificity(&self) -> u8 {
        match self {
            Scope::Symbology(_) => 2,
            Scope::Families(_) => 1,
            Scope::Any => 0,
        }
    }
}

#[derive(Debug, Clone)]
struct ScopedIdentity {
    scope: Scope,
    identity: ParameterIdentity,
}

/// Read-only parameter catalog keyed by (parameter, device, symbology).
///
/// Built once and shared; lookups never mutate it.
#[derive(Debug, Clone)]
pub struct ParameterCatalog {
    entries: HashMap<(Parameter, Device), Vec<ScopedIdentity>>,
}

impl ParameterCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        let mut entries: HashMap<(Parameter, Device), Vec<ScopedIdentity>> = HashMap::new();

        let per_device = [
            (Device::JsonRich, config.json_rich),
            (Device::JsonAlt, config.json_alt),
            (Device::FixedText, config.fixed_text),
        ];

        for (device, list) in per_device {
            for entry in list {
                let scope = match (entry.symbology, entry.families.is_empty()) {
                    (Some(symbology), _) => Scope::Symbology(symbology),
                    (None, false) => Scope::Families(entry.families),
                    (None, true) => Scope::Any,
                };
                entries
                    .entry((entry.name, device))
                    .or_default()
                    .push(ScopedIdentity {
                        scope,
                        identity: ParameterIdentity {
                            parameter: entry.name,
                            device,
                            path: entry.path,
                            kind: entry.kind,
                            gs1_only: entry.gs1_only,
                        },
                    });
            }
        }

        Self { entries }
    }

    /// The process-wide catalog built from the embedded TOML.
    pub fn global() -> &'static ParameterCatalog {
        GLOBAL.get_or_init(default_catalog)
    }

    /// Find where `parameter` lives for a device/symbology combination.
    ///
    /// A symbology-scoped entry beats a family-scoped one, which beats an
    /// unscoped one. Among equally specific entries the first declared wins.
    pub fn lookup(
        &self,
        parameter: Parameter,
        device: Device,
        symbology: Symbology,
    ) -> Result<&ParameterIdentity, CatalogError> {
        let mut best: Option<&ScopedIdentity> = None;

        for candidate in self.entries.get(&(parameter, device)).into_iter().flatten() {
            if !candidate.scope.matches(symbology) {
                continue;
            }
            if best.map_or(true, |b| candidate.scope.specificity() > b.scope.specificity()) {
                best = Some(candidate);
            }
        }

        best.map(|b| &b.identity).ok_or(CatalogError::NotFound {
            parameter,
            device,
            symbology,
        })
    }

    /// Every parameter defined for a device/symbology, in `Parameter::ALL` order.
    pub fn parameters_for(&self, device: Device, symbology: Symbology) -> Vec<&ParameterIdentity> {
        Parameter::ALL
            .iter()
            .filter_map(|p| self.lookup(*p, device, symbology).ok())
            .collect()
    }
}

/// Load a catalog from a TOML file at the given path.
///
/// # Returns
/// * `Ok(ParameterCatalog)` - Parsed catalog
/// * `Err` - If file cannot be read or TOML is invalid
pub fn load_catalog(path: &Path) -> Result<ParameterCatalog> {
    let content = std::fs::read_to_string(path)?;
    let config: CatalogConfig = toml::from_str(&content)?;
    Ok(ParameterCatalog::new(config))
}

/// Build the catalog embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_catalog() -> ParameterCatalog {
    let config: CatalogConfig =
        toml::from_str(DEFAULT_CATALOG).expect("embedded parameter_catalog.toml must be valid TOML");
    ParameterCatalog::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = default_catalog();
        for device in Device::ALL {
            assert!(
                !catalog.parameters_for(device, Symbology::DataMatrix).is_empty(),
                "{} should define matrix parameters",
                device
            );
            assert!(
                !catalog.parameters_for(device, Symbology::Code128).is_empty(),
                "{} should define linear parameters",
                device
            );
        }
    }

    #[test]
    fn test_lookup_returns_path_and_kind() {
        let catalog = default_catalog();
        let identity = catalog
            .lookup(Parameter::SymbolContrast, Device::JsonAlt, Symbology::Code128)
            .unwrap();
        assert_eq!(identity.path, "grading.iso15416.symbolContrast");
        assert_eq!(identity.kind, ValueKind::GradeValue);
    }

    #[test]
    fn test_lookup_miss_is_not_found() {
        let catalog = default_catalog();
        let err = catalog
            .lookup(Parameter::FixedPatternDamage, Device::FixedText, Symbology::Code128)
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::NotFound {
                parameter: Parameter::FixedPatternDamage,
                device: Device::FixedText,
                symbology: Symbology::Code128,
            }
        );
    }

    #[test]
    fn test_symbology_scope_beats_family_scope() {
        let catalog = default_catalog();
        let qr = catalog
            .lookup(Parameter::ErrorCorrectionLevel, Device::JsonRich, Symbology::Qr)
            .unwrap();
        assert_eq!(qr.path, "eccLevel");

        let dm = catalog
            .lookup(Parameter::ErrorCorrectionLevel, Device::JsonRich, Symbology::DataMatrix)
            .unwrap();
        assert_eq!(dm.path, "errorCorrectionLevel");
    }

    #[test]
    fn test_any_scope_applies_to_ocr() {
        let catalog = default_catalog();
        let params: Vec<Parameter> = catalog
            .parameters_for(Device::JsonRich, Symbology::Ocr)
            .iter()
            .map(|i| i.parameter)
            .collect();
        assert_eq!(params, vec![Parameter::OverallGrade, Parameter::Gs1Data]);
    }

    #[test]
    fn test_parameters_follow_declaration_order() {
        let catalog = default_catalog();
        let params: Vec<Parameter> = catalog
            .parameters_for(Device::FixedText, Symbology::Code128)
            .iter()
            .map(|i| i.parameter)
            .collect();
        let mut sorted = params.clone();
        sorted.sort();
        assert_eq!(params, sorted);
        assert!(params.contains(&Parameter::Modulation));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"fixed_text = [ {{ name = "decode", path = "Decode Grade", kind = "grade" }} ]"#
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        let identity = catalog
            .lookup(Parameter::Decode, Device::FixedText, Symbology::Aztec)
            .unwrap();
        assert_eq!(identity.path, "Decode Grade");
        assert!(catalog
            .lookup(Parameter::Decode, Device::JsonRich, Symbology::Aztec)
            .is_err());
    }

    #[test]
    fn test_load_catalog_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "json_rich = [ {{ name = \"nope\" }} ]").unwrap();
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_global_is_shared() {
        let a = ParameterCatalog::global() as *const ParameterCatalog;
        let b = ParameterCatalog::global() as *const ParameterCatalog;
        assert_eq!(a, b);
    }
}
