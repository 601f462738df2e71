//! Job context handed in with each device read, and the sector template
//! built from it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::report::parse::{number_value, value_at};

/// Operator/job context supplied alongside a raw device payload.
///
/// Wraps the raw JSON object so device-specific keys survive untouched.
/// Typed accessors cover the keys the adapters read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobContext {
    data: Map<String, Value>,
}

impl JobContext {
    /// Parse a job context from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self { data })
    }

    // --- Typed accessors (all return Option) ---

    /// Sector name used to match stored and current sectors.
    pub fn name(&self) -> Option<&str> {
        self.data.get("name")?.as_str()
    }

    /// Operator-facing label for the sector.
    pub fn username(&self) -> Option<&str> {
        self.data.get("username")?.as_str()
    }

    /// Pixels per inch of the imaging device, used to convert pixel sizes.
    pub fn ppi(&self) -> Option<f64> {
        self.number("ppi").filter(|ppi| *ppi > 0.0)
    }

    /// Whether GS1 grading is enabled for this job.
    pub fn gs1_enabled(&self) -> bool {
        self.flag("gradingStandard.enabled")
    }

    /// The GS1 table id configured for this job ("1", "7.1", ...).
    pub fn gs1_table_id(&self) -> Option<String> {
        match self.get("gradingStandard.tableId")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    // --- Helpers ---

    /// Value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.splitn(2, '.');
        let head = self.data.get(segments.next()?)?;
        match segments.next() {
            Some(rest) => value_at(head, rest),
            None => Some(head).filter(|v| !v.is_null()),
        }
    }

    pub fn number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(number_value)
    }

    pub fn flag(&self, path: &str) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Sector location on the label image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

/// How the device matches decoded data against expectations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchSettings {
    pub mode: String,
    pub expected: Option<String>,
}

/// Static description of a sector as configured on the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub username: String,
    pub symbology_type: String,
    pub geometry: Geometry,
    pub orientation: f64,
    pub match_settings: Option<MatchSettings>,
    /// Blemish-mask layer names (blemish sectors only)
    pub blemish_mask: Vec<String>,
}

impl Template {
    /// Build a template from job context keys.
    ///
    /// Absent keys fall back to empty/zero values; `username` falls back to
    /// `name`.
    pub fn from_job(job: &JobContext) -> Self {
        let name = job.name().unwrap_or_default().to_string();
        let username = job
            .username()
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());

        let geometry = Geometry {
            top: job.number("top").unwrap_or(0.0),
            left: job.number("left").unwrap_or(0.0),
            width: job.number("width").unwrap_or(0.0),
            height: job.number("height").unwrap_or(0.0),
            angle_deg: job.number("angleDeg").unwrap_or(0.0),
        };

        let match_settings = job
            .get("matchSettings")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        let blemish_mask = job
            .get("blemishMask.layers")
            .and_then(Value::as_array)
            .map(|layers| {
                layers
                    .iter()
                    .filter_map(|l| l.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name,
            username,
            symbology_type: job
                .get("symbologyType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            geometry,
            orientation: job.number("orientation").unwrap_or(0.0),
            match_settings,
            blemish_mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobContext {
        JobContext::from_json(
            r#"{
                "name": "Sector1",
                "username": "Lot code",
                "top": 10, "left": 20, "width": 300, "height": 120, "angleDeg": 90,
                "orientation": 90,
                "symbologyType": "dataMatrix",
                "matchSettings": { "mode": "exact", "expected": "ABC" },
                "blemishMask": { "layers": ["logo", "border"] },
                "gradingStandard": { "enabled": true, "tableId": 7.1 },
                "ppi": "600"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let job = job();
        assert_eq!(job.name(), Some("Sector1"));
        assert_eq!(job.username(), Some("Lot code"));
        assert_eq!(job.ppi(), Some(600.0));
        assert!(job.gs1_enabled());
        assert_eq!(job.gs1_table_id().as_deref(), Some("7.1"));
        assert!(!job.flag("iso15415.enabled"));
    }

    #[test]
    fn test_template_from_job() {
        let template = Template::from_job(&job());
        assert_eq!(template.name, "Sector1");
        assert_eq!(template.geometry.width, 300.0);
        assert_eq!(template.geometry.angle_deg, 90.0);
        assert_eq!(template.orientation, 90.0);
        assert_eq!(template.symbology_type, "dataMatrix");
        assert_eq!(
            template.match_settings,
            Some(MatchSettings {
                mode: "exact".to_string(),
                expected: Some("ABC".to_string())
            })
        );
        assert_eq!(template.blemish_mask, vec!["logo", "border"]);
    }

    #[test]
    fn test_template_defaults_from_empty_job() {
        let template = Template::from_job(&JobContext::default());
        assert_eq!(template, Template::default());
    }

    #[test]
    fn test_username_falls_back_to_name() {
        let job = JobContext::from_json(r#"{"name": "S2"}"#).unwrap();
        assert_eq!(Template::from_job(&job).username, "S2");
    }
}
