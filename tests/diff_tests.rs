use std::io::Write;
use std::path::PathBuf;

use sectorval::adapters::adapter_for;
use sectorval::catalog::{Device, Parameter, Symbology};
use sectorval::diff::{compare, compare_sector_sets, load_settings, DiffEngine, DiffSettings, SymbologyMismatch};
use sectorval::grade::Grade;
use sectorval::report::{Alarm, AlarmCategory, ParameterValue};
use sectorval::sector::Sector;
use sectorval::standards::{Gs1Table, Standard};
use sectorval::template::JobContext;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

fn sector(device: Device, payload: &str, job_file: &str) -> Sector {
    let job = JobContext::from_json(&read_fixture(job_file)).expect("Failed to parse job fixture");
    Sector::from_payload(
        adapter_for(device).as_ref(),
        &read_fixture(payload),
        &job,
        Standard::None,
        Gs1Table::None,
    )
    .expect("Failed to build sector")
}

fn stored_code128() -> Sector {
    sector(Device::JsonRich, "json_rich_code128.json", "job_code128.json")
}

fn current_code128() -> Sector {
    sector(Device::JsonRich, "json_rich_code128_current.json", "job_code128.json")
}

// ==================== Identity ====================

#[test]
fn test_self_diff_is_empty_for_every_fixture() {
    let sectors = [
        stored_code128(),
        current_code128(),
        sector(Device::JsonAlt, "json_alt_datamatrix.json", "job_datamatrix.json"),
        sector(Device::JsonAlt, "json_alt_failed_read.json", "job_datamatrix.json"),
        sector(Device::FixedText, "fixed_text_code128.txt", "job_code128.json"),
    ];
    let engine = DiffEngine::default();

    for s in &sectors {
        let diff = engine.compare_sectors(s, s);
        assert!(!diff.is_not_empty(), "Sector '{}' differs from itself: {:?}", s.name(), diff);
        assert!(!compare(&s.report().parameters, &s.report().parameters).is_not_empty());
    }
}

// ==================== Stored vs current ====================

#[test]
fn test_stored_vs_current_code128() {
    let stored = stored_code128();
    let current = current_code128();

    let diff = DiffEngine::default().compare_sectors(&stored, &current);

    assert_eq!(diff.name, "Sector1");
    assert_eq!(diff.username, "Carton barcode");
    assert!(diff.is_not_empty());

    let changed: Vec<Parameter> = diff.parameters.iter().map(ParameterValue::parameter).collect();
    assert_eq!(
        changed,
        vec![Parameter::OverallGrade, Parameter::SymbolContrast, Parameter::BarHeight],
        "Modulation 3.6/3.55 is B on both sides; X dimension is inside the window"
    );
    assert_eq!(
        diff.parameters[1],
        ParameterValue::GradeValue {
            parameter: Parameter::SymbolContrast,
            value: 52.0,
            grade: Grade::new(2.9),
        },
        "The current entry is reported"
    );
    assert!(diff.parameters[2].is_missing(), "Bar height is gone from the current read");

    assert_eq!(diff.alarms.len(), 1);
    assert_eq!(diff.alarms[0].name, "Symbol contrast below threshold");
    assert_eq!(diff.alarms[0].category, AlarmCategory::Error);
    assert!(diff.symbology_mismatch.is_none());
    assert!(!diff.is_sector_missing());
}

#[test]
fn test_settings_file_tightens_value_window() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[value]\nvalue_tolerance = 0.1").unwrap();
    let settings = load_settings(file.path()).expect("Failed to load settings");

    let diff = DiffEngine::new(settings).compare_sectors(&stored_code128(), &current_code128());

    assert_eq!(
        diff.parameters.get(2),
        Some(&ParameterValue::ValueDouble {
            parameter: Parameter::SymbolXDim,
            value: 10.3,
        }),
        "10.1 -> 10.3 exceeds a 0.1 window"
    );
}

#[test]
fn test_value_result_by_value() {
    let mut settings = DiffSettings::default();
    settings.value_result.use_result = false;
    settings.value_result.value_tolerance = 1.0;

    let diff = DiffEngine::new(settings).compare_sectors(&stored_code128(), &current_code128());
    assert!(
        diff.parameters
            .iter()
            .any(|p| p.parameter() == Parameter::QuietZone),
        "Quiet zone 12.4 -> 9.0 differs by value even though both pass"
    );
}

// ==================== Sector-level markers ====================

#[test]
fn test_symbology_mismatch_short_circuits() {
    let stored = stored_code128();
    // Same sector name, different symbol in the field of view
    let current = sector(Device::JsonAlt, "json_alt_datamatrix.json", "job_code128.json");

    let diff = DiffEngine::default().compare_sectors(&stored, &current);
    assert_eq!(
        diff.symbology_mismatch,
        Some(SymbologyMismatch {
            stored: Symbology::Code128,
            current: Symbology::DataMatrix,
        })
    );
    assert!(diff.parameters.is_empty());
    assert!(diff.alarms.is_empty());
}

#[test]
fn test_sector_sets() {
    let stored = vec![
        stored_code128(),
        sector(Device::JsonAlt, "json_alt_datamatrix.json", "job_datamatrix.json"),
    ];
    let current = vec![current_code128()];

    let diffs = compare_sector_sets(&stored, &current, &DiffSettings::default());

    assert_eq!(diffs.len(), 2);
    assert_eq!(diffs[0].name, "Sector1");
    assert!(!diffs[0].is_sector_missing());
    assert_eq!(diffs[1].name, "Sector2");
    assert!(diffs[1].is_sector_missing());
    assert!(diffs[1].parameters.is_empty(), "A missing sector carries only the marker");
}

#[test]
fn test_unchanged_sector_sets_are_empty() {
    let sectors = vec![stored_code128()];
    assert!(compare_sector_sets(&sectors, &sectors, &DiffSettings::default()).is_empty());
}

#[test]
fn test_ocv_text_change() {
    let job = JobContext::from_json(r#"{"name": "Lot", "username": "Lot text"}"#).unwrap();
    let read = |text: &str| {
        let payload = format!(
            r#"{{"data": {{"symbolType": "OCV", "text": "{}", "score": 92}}}}"#,
            text
        );
        Sector::from_payload(
            adapter_for(Device::JsonRich).as_ref(),
            &payload,
            &job,
            Standard::None,
            Gs1Table::None,
        )
        .unwrap()
    };

    let engine = DiffEngine::default();
    let same = engine.compare_sectors(&read("LOT 2026-10"), &read("LOT 2026-10"));
    assert!(!same.is_not_ocv_match());

    let diff = engine.compare_sectors(&read("LOT 2026-10"), &read("LOT 2026-11"));
    assert!(diff.is_not_ocv_match());
    assert_eq!(diff.ocv_mismatch.as_deref(), Some("LOT 2026-10 / LOT 2026-11"));
}

#[test]
fn test_alarm_removed_in_current() {
    let mut stored = vec![Alarm::warning("Quiet zone"), Alarm::error("Decode")];
    let current = vec![Alarm::warning("Quiet zone")];

    let diff = DiffEngine::default().compare_alarms(&stored, &current);
    assert_eq!(diff, vec![Alarm::error("Decode")]);

    stored.clear();
    assert_eq!(DiffEngine::default().compare_alarms(&stored, &current), current);
}

#[test]
fn test_overflowing_field_keeps_self_diff_and_persistence() {
    let packet = read_fixture("fixed_text_code128.txt")
        .replace("Bar Height,480", &format!("Bar Height,{}", "9".repeat(400)));
    let job = JobContext::from_json(&read_fixture("job_code128.json")).unwrap();
    let s = Sector::from_payload(
        adapter_for(Device::FixedText).as_ref(),
        &packet,
        &job,
        Standard::Iso15416,
        Gs1Table::None,
    )
    .expect("An oversized field must not abort the sector");

    assert_eq!(
        s.report().parameters.get(Parameter::BarHeight),
        Some(&ParameterValue::ValueDouble {
            parameter: Parameter::BarHeight,
            value: 0.0,
        })
    );
    assert!(!DiffEngine::default().compare_sectors(&s, &s).is_not_empty());

    let json = serde_json::to_string(&s).unwrap();
    let restored: Sector = serde_json::from_str(&json).expect("Sector must reload");
    assert_eq!(restored, s);
}
