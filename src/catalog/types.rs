//! Vocabulary shared by the catalog, the adapters and the differencing engine.
//!
//! These types serialize with stable names so persisted sectors and the
//! embedded catalog TOML use the same spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// DEVICES
// =============================================================================

/// The three report dialects the crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Nested JSON report with grade objects and an alarm list.
    JsonRich,
    /// Flat JSON report with ISO grading sections and a `read` flag.
    JsonAlt,
    /// Carriage-return delimited "Key, Value" text packet.
    FixedText,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::JsonRich, Device::JsonAlt, Device::FixedText];

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::JsonRich => "json_rich",
            Device::JsonAlt => "json_alt",
            Device::FixedText => "fixed_text",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Device::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| format!("unknown device '{}' (expected json_rich, json_alt or fixed_text)", s))
    }
}

// =============================================================================
// SYMBOLOGIES
// =============================================================================

/// Closed set of symbologies a sector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Symbology {
    Code128,
    Code39,
    Code93,
    Codabar,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Itf14,
    Interleaved2of5,
    DataBarOmni,
    DataBarLimited,
    DataBarExpanded,
    DataBarStacked,
    DataBarExpandedStacked,
    Pdf417,
    MicroPdf417,
    DataMatrix,
    Qr,
    MicroQr,
    Aztec,
    Ocr,
    Ocv,
    Blemish,
    Unknown,
}

/// Ordered substring table used by [`Symbology::from_vendor_name`].
///
/// Input is lowercased with spaces, hyphens and underscores removed before
/// matching. More specific names come first.
const VENDOR_NAMES: &[(&str, Symbology)] = &[
    ("micropdf", Symbology::MicroPdf417),
    ("pdf417", Symbology::Pdf417),
    ("microqr", Symbology::MicroQr),
    ("qr", Symbology::Qr),
    ("datamatrix", Symbology::DataMatrix),
    ("ecc200", Symbology::DataMatrix),
    ("aztec", Symbology::Aztec),
    ("expandedstacked", Symbology::DataBarExpandedStacked),
    ("expanded", Symbology::DataBarExpanded),
    ("databarlimited", Symbology::DataBarLimited),
    ("rsslimited", Symbology::DataBarLimited),
    ("stacked", Symbology::DataBarStacked),
    ("databar", Symbology::DataBarOmni),
    ("rss14", Symbology::DataBarOmni),
    ("gs1128", Symbology::Code128),
    ("ucc128", Symbology::Code128),
    ("code128", Symbology::Code128),
    ("code39", Symbology::Code39),
    ("code93", Symbology::Code93),
    ("codabar", Symbology::Codabar),
    ("ean13", Symbology::Ean13),
    ("ean8", Symbology::Ean8),
    ("upca", Symbology::UpcA),
    ("upce", Symbology::UpcE),
    ("itf14", Symbology::Itf14),
    ("interleaved2of5", Symbology::Interleaved2of5),
    ("i2of5", Symbology::Interleaved2of5),
    ("itf", Symbology::Interleaved2of5),
    ("ocv", Symbology::Ocv),
    ("ocr", Symbology::Ocr),
    ("blemish", Symbology::Blemish),
];

impl Symbology {
    /// Map a vendor symbology string to the closed enumeration.
    ///
    /// Unrecognized names map to `Unknown`.
    pub fn from_vendor_name(name: &str) -> Symbology {
        let normalized: String = name
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();

        if normalized.is_empty() {
            return Symbology::Unknown;
        }

        VENDOR_NAMES
            .iter()
            .find(|(needle, _)| normalized.contains(needle))
            .map(|(_, symbology)| *symbology)
            .unwrap_or(Symbology::Unknown)
    }

    pub fn family(&self) -> Family {
        match self {
            Symbology::Code128
            | Symbology::Code39
            | Symbology::Code93
            | Symbology::Codabar
            | Symbology::Ean13
            | Symbology::Ean8
            | Symbology::UpcA
            | Symbology::UpcE
            | Symbology::Itf14
            | Symbology::Interleaved2of5
            | Symbology::DataBarOmni
            | Symbology::DataBarLimited
            | Symbology::DataBarExpanded => Family::Linear,
            Symbology::DataBarStacked
            | Symbology::DataBarExpandedStacked
            | Symbology::Pdf417
            | Symbology::MicroPdf417 => Family::Stacked,
            Symbology::DataMatrix | Symbology::Qr | Symbology::MicroQr | Symbology::Aztec => {
                Family::Matrix
            }
            Symbology::Ocr | Symbology::Ocv => Family::Ocr,
            Symbology::Blemish => Family::Blemish,
            Symbology::Unknown => Family::Unknown,
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Symbology families, used to scope catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Linear,
    Stacked,
    Matrix,
    Ocr,
    Blemish,
    Unknown,
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Logical parameter names, shared by every device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    OverallGrade,
    Decode,
    SymbolContrast,
    MinimumReflectance,
    MaximumReflectance,
    MinimumEdgeContrast,
    Modulation,
    Defects,
    Decodability,
    ReflectanceMargin,
    AxialNonUniformity,
    GridNonUniformity,
    UnusedErrorCorrection,
    FixedPatternDamage,
    CodewordYield,
    CodewordPrintQuality,
    EdgeDetermination,
    QuietZone,
    PrintGrowthHorizontal,
    PrintGrowthVertical,
    SymbolXDim,
    BarHeight,
    CellSize,
    SymbolWidth,
    SymbolHeight,
    Rows,
    Columns,
    BarCount,
    ErrorCorrectionLevel,
    Gs1Data,
}

impl Parameter {
    pub const ALL: [Parameter; 30] = [
        Parameter::OverallGrade,
        Parameter::Decode,
        Parameter::SymbolContrast,
        Parameter::MinimumReflectance,
        Parameter::MaximumReflectance,
        Parameter::MinimumEdgeContrast,
        Parameter::Modulation,
        Parameter::Defects,
        Parameter::Decodability,
        Parameter::ReflectanceMargin,
        Parameter::AxialNonUniformity,
        Parameter::GridNonUniformity,
        Parameter::UnusedErrorCorrection,
        Parameter::FixedPatternDamage,
        Parameter::CodewordYield,
        Parameter::CodewordPrintQuality,
        Parameter::EdgeDetermination,
        Parameter::QuietZone,
        Parameter::PrintGrowthHorizontal,
        Parameter::PrintGrowthVertical,
        Parameter::SymbolXDim,
        Parameter::BarHeight,
        Parameter::CellSize,
        Parameter::SymbolWidth,
        Parameter::SymbolHeight,
        Parameter::Rows,
        Parameter::Columns,
        Parameter::BarCount,
        Parameter::ErrorCorrectionLevel,
        Parameter::Gs1Data,
    ];

    /// The camelCase name used in payload paths, TOML and JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::OverallGrade => "overallGrade",
            Parameter::Decode => "decode",
            Parameter::SymbolContrast => "symbolContrast",
            Parameter::MinimumReflectance => "minimumReflectance",
            Parameter::MaximumReflectance => "maximumReflectance",
            Parameter::MinimumEdgeContrast => "minimumEdgeContrast",
            Parameter::Modulation => "modulation",
            Parameter::Defects => "defects",
            Parameter::Decodability => "decodability",
            Parameter::ReflectanceMargin => "reflectanceMargin",
            Parameter::AxialNonUniformity => "axialNonUniformity",
            Parameter::GridNonUniformity => "gridNonUniformity",
            Parameter::UnusedErrorCorrection => "unusedErrorCorrection",
            Parameter::FixedPatternDamage => "fixedPatternDamage",
            Parameter::CodewordYield => "codewordYield",
            Parameter::CodewordPrintQuality => "codewordPrintQuality",
            Parameter::EdgeDetermination => "edgeDetermination",
            Parameter::QuietZone => "quietZone",
            Parameter::PrintGrowthHorizontal => "printGrowthHorizontal",
            Parameter::PrintGrowthVertical => "printGrowthVertical",
            Parameter::SymbolXDim => "symbolXDim",
            Parameter::BarHeight => "barHeight",
            Parameter::CellSize => "cellSize",
            Parameter::SymbolWidth => "symbolWidth",
            Parameter::SymbolHeight => "symbolHeight",
            Parameter::Rows => "rows",
            Parameter::Columns => "columns",
            Parameter::BarCount => "barCount",
            Parameter::ErrorCorrectionLevel => "errorCorrectionLevel",
            Parameter::Gs1Data => "gs1Data",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value variant a catalog entry produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Grade,
    GradeValue,
    ValueDouble,
    ValueString,
    PassFail,
    ValuePassFail,
    OverallGrade,
    Gs1Decode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_names_map_to_symbologies() {
        let cases = [
            ("Code 128", Symbology::Code128),
            ("GS1-128", Symbology::Code128),
            ("Data Matrix", Symbology::DataMatrix),
            ("dataMatrix", Symbology::DataMatrix),
            ("QR Code", Symbology::Qr),
            ("qrCode", Symbology::Qr),
            ("Micro QR", Symbology::MicroQr),
            ("PDF417", Symbology::Pdf417),
            ("MicroPDF417", Symbology::MicroPdf417),
            ("DataBar Expanded Stacked", Symbology::DataBarExpandedStacked),
            ("DataBar Expanded", Symbology::DataBarExpanded),
            ("DataBar Limited", Symbology::DataBarLimited),
            ("DataBar Omnidirectional", Symbology::DataBarOmni),
            ("DataBar", Symbology::DataBarOmni),
            ("UPC-A", Symbology::UpcA),
            ("EAN-13", Symbology::Ean13),
            ("ITF-14", Symbology::Itf14),
            ("Interleaved 2 of 5", Symbology::Interleaved2of5),
            ("ocr", Symbology::Ocr),
            ("OCV", Symbology::Ocv),
            ("blemish", Symbology::Blemish),
        ];

        for (name, expected) in cases {
            assert_eq!(
                Symbology::from_vendor_name(name),
                expected,
                "'{}' should map to {:?}",
                name,
                expected
            );
        }
    }

    #[test]
    fn test_unrecognized_vendor_name_is_unknown() {
        assert_eq!(Symbology::from_vendor_name("Hieroglyphs"), Symbology::Unknown);
        assert_eq!(Symbology::from_vendor_name(""), Symbology::Unknown);
    }

    #[test]
    fn test_families() {
        assert_eq!(Symbology::Code128.family(), Family::Linear);
        assert_eq!(Symbology::Pdf417.family(), Family::Stacked);
        assert_eq!(Symbology::DataMatrix.family(), Family::Matrix);
        assert_eq!(Symbology::Ocv.family(), Family::Ocr);
        assert_eq!(Symbology::Unknown.family(), Family::Unknown);
    }

    #[test]
    fn test_parameter_name_matches_serde() {
        for parameter in Parameter::ALL {
            let json = serde_json::to_value(parameter).unwrap();
            assert_eq!(json, parameter.name(), "serde name of {:?} drifted", parameter);
        }
    }

    #[test]
    fn test_device_from_str() {
        assert_eq!("json-rich".parse::<Device>().unwrap(), Device::JsonRich);
        assert_eq!("FIXED_TEXT".parse::<Device>().unwrap(), Device::FixedText);
        assert!("serial".parse::<Device>().is_err());
    }
}
