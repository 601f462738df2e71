//! Grading standards, GS1 tables and the compatibility check between what
//! the operator asked for and what the device actually graded against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grading standard a sector is (or should be) graded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Standard {
    None,
    Unsupported,
    #[serde(rename = "iso15415_15416")]
    Iso15415And15416,
    #[serde(rename = "iso15415")]
    Iso15415,
    #[serde(rename = "iso15416")]
    Iso15416,
    #[serde(rename = "iso29158")]
    Iso29158,
    Gs1,
}

impl Standard {
    pub const ALL: [Standard; 7] = [
        Standard::None,
        Standard::Unsupported,
        Standard::Iso15415And15416,
        Standard::Iso15415,
        Standard::Iso15416,
        Standard::Iso29158,
        Standard::Gs1,
    ];

    /// Parse a human-readable standard label ("ISO/IEC 15415 & 15416",
    /// "GS1 General Specifications", ...).
    ///
    /// Empty or "none" labels are `None`; anything unrecognized is
    /// `Unsupported`.
    pub fn from_label(label: &str) -> Standard {
        let lower = label.trim().to_lowercase();

        if lower.is_empty() || lower == "none" {
            return Standard::None;
        }
        if lower.contains("gs1") {
            return Standard::Gs1;
        }

        match (lower.contains("15415"), lower.contains("15416")) {
            (true, true) => Standard::Iso15415And15416,
            (true, false) => Standard::Iso15415,
            (false, true) => Standard::Iso15416,
            (false, false) if lower.contains("29158") => Standard::Iso29158,
            (false, false) => Standard::Unsupported,
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Standard::None => "None",
            Standard::Unsupported => "Unsupported",
            Standard::Iso15415And15416 => "ISO/IEC 15415 & 15416",
            Standard::Iso15415 => "ISO/IEC 15415",
            Standard::Iso15416 => "ISO/IEC 15416",
            Standard::Iso29158 => "ISO/IEC TR 29158",
            Standard::Gs1 => "GS1",
        };
        f.write_str(label)
    }
}

/// GS1 General Specifications symbol specification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gs1Table {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "1")]
    Table1,
    #[serde(rename = "1.8200")]
    Table1_8200,
    #[serde(rename = "2")]
    Table2,
    #[serde(rename = "3")]
    Table3,
    #[serde(rename = "4")]
    Table4,
    #[serde(rename = "5")]
    Table5,
    #[serde(rename = "6")]
    Table6,
    #[serde(rename = "7.1")]
    Table7_1,
    #[serde(rename = "7.2")]
    Table7_2,
    #[serde(rename = "7.3")]
    Table7_3,
    #[serde(rename = "7.4")]
    Table7_4,
    #[serde(rename = "8")]
    Table8,
    #[serde(rename = "9")]
    Table9,
    #[serde(rename = "10")]
    Table10,
    #[serde(rename = "11")]
    Table11,
    #[serde(rename = "12.1")]
    Table12_1,
    #[serde(rename = "12.2")]
    Table12_2,
    #[serde(rename = "12.3")]
    Table12_3,
    #[serde(rename = "13")]
    Table13,
    #[serde(rename = "unsupported")]
    Unsupported,
}

/// Table identifiers as they appear after "Table" in device labels.
const TABLE_IDS: &[(&str, Gs1Table)] = &[
    ("1.8200", Gs1Table::Table1_8200),
    ("1", Gs1Table::Table1),
    ("2", Gs1Table::Table2),
    ("3", Gs1Table::Table3),
    ("4", Gs1Table::Table4),
    ("5", Gs1Table::Table5),
    ("6", Gs1Table::Table6),
    ("7.1", Gs1Table::Table7_1),
    ("7.2", Gs1Table::Table7_2),
    ("7.3", Gs1Table::Table7_3),
    ("7.4", Gs1Table::Table7_4),
    ("8", Gs1Table::Table8),
    ("9", Gs1Table::Table9),
    ("10", Gs1Table::Table10),
    ("11", Gs1Table::Table11),
    ("12.1", Gs1Table::Table12_1),
    ("12.2", Gs1Table::Table12_2),
    ("12.3", Gs1Table::Table12_3),
    ("13", Gs1Table::Table13),
];

impl Gs1Table {
    /// Resolve a table label ("Table 1", "GS1 Table 7.1", "7.2", "1 (8200)").
    ///
    /// The identifier is the run of digits and dots following the last
    /// "table" marker (or the whole label when there is none). A label
    /// mentioning 8200 resolves to the 8200 variant of Table 1. Unmatched
    /// identifiers resolve to `Unsupported`.
    pub fn from_label(label: &str) -> Gs1Table {
        let lower = label.trim().to_lowercase();

        if lower == "none" {
            return Gs1Table::None;
        }
        if lower.contains("8200") {
            return Gs1Table::Table1_8200;
        }

        let rest = match lower.rfind("table") {
            Some(idx) => &lower[idx + "table".len()..],
            None => lower.as_str(),
        };

        let id: String = rest
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let id = id.trim_end_matches('.');

        TABLE_IDS
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, table)| *table)
            .unwrap_or(Gs1Table::Unsupported)
    }
}

impl fmt::Display for Gs1Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gs1Table::None => f.write_str("None"),
            Gs1Table::Unsupported => f.write_str("Unsupported"),
            table => {
                let id = TABLE_IDS
                    .iter()
                    .find(|(_, t)| t == table)
                    .map(|(id, _)| *id)
                    .unwrap_or("?");
                write!(f, "Table {}", id)
            }
        }
    }
}

/// Whether the actual standard/table fails to satisfy the desired one.
///
/// `true` means the sector was graded against the wrong standard.
pub fn is_wrong_standard(
    desired_standard: Standard,
    desired_table: Gs1Table,
    actual_standard: Standard,
    actual_table: Gs1Table,
) -> bool {
    match desired_standard {
        Standard::None => false,
        Standard::Unsupported => true,
        Standard::Iso15415And15416 => !matches!(
            actual_standard,
            Standard::Iso15415And15416
                | Standard::Iso15415
                | Standard::Iso15416
                | Standard::Unsupported
        ),
        Standard::Iso15415 => !matches!(
            actual_standard,
            Standard::Iso15415And15416 | Standard::Iso15415
        ),
        Standard::Iso15416 => !matches!(
            actual_standard,
            Standard::Iso15415And15416 | Standard::Iso15416
        ),
        Standard::Gs1 => !(actual_standard == Standard::Gs1 && actual_table == desired_table),
        Standard::Iso29158 => true,
    }
}
