//! Loading configuration from disk

use std::io::Write;

use riverwatch_service::{ConfigLoadError, MonitorConfig};

#[test]
fn loads_full_document_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
freshness_threshold_minutes = 5
analysis_ttl_minutes = 30
insert_batch_size = 250
calibration_password = "from-file"

[detector]
min_history = 12
window = 24
erratic_ratio = 0.5
erratic_min_mean = 2.0
"#
    )
    .unwrap();

    let config = MonitorConfig::from_file(file.path()).unwrap();
    assert_eq!(config.freshness().threshold_minutes, 5);
    assert_eq!(config.analysis_ttl().ttl_minutes, 30);
    assert_eq!(config.insert_batch_size, 250);
    assert_eq!(config.calibration_password.as_deref(), Some("from-file"));
    assert_eq!(config.detector.window, 24);
    assert_eq!(config.detector.erratic_ratio, 0.5);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    match MonitorConfig::from_file(&path) {
        Err(ConfigLoadError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn invalid_detector_window_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[detector]\nwindow = 0").unwrap();
    assert!(matches!(
        MonitorConfig::from_file(file.path()),
        Err(ConfigLoadError::Invalid(_))
    ));
}
