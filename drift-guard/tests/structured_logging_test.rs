//! Integration tests for the structured events emitted around fit and validate.

use std::io::Write;
use std::sync::{Arc, Mutex};

use drift_guard::logging::LogConfig;
use drift_guard::prelude::*;

/// Test helper to capture JSON log lines.
#[derive(Clone, Default)]
struct LogCapture {
    logs: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    fn events(&self) -> Vec<serde_json::Value> {
        self.logs
            .lock()
            .unwrap()
            .concat()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(buf).to_string());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture(filter: &str) -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(move || writer.clone())
        .with_env_filter(filter)
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

fn reference() -> FeatureTable {
    FeatureTable::builder()
        .column("plan", ["free", "pro"])
        .column("spend", [0.0, 100.0])
        .build()
        .unwrap()
}

fn runtime() -> FeatureTable {
    FeatureTable::builder()
        .column("plan", ["gold", "silver", "free"])
        .column("spend", [50.0, 500.0, 10.0])
        .build()
        .unwrap()
}

#[test]
fn test_findings_are_logged_as_warnings() {
    let (capture, _guard) = capture("warn");

    let mut monitor = DataMonitor::builder().name("pricing").build();
    monitor.fit(&reference(), &FeatureKinds::infer()).unwrap();
    monitor.validate(&runtime()).unwrap();

    let warnings: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e["level"] == "WARN")
        .collect();
    assert_eq!(warnings.len(), 2);

    let above = &warnings[0]["fields"];
    assert_eq!(above["monitor"], "pricing");
    assert_eq!(above["kind"], "above_max");
    assert_eq!(above["feature"], "spend");
    assert_eq!(above["count"], 1);

    let unknown = &warnings[1]["fields"];
    assert_eq!(unknown["kind"], "unknown_category");
    assert_eq!(unknown["values"], "gold, silver");
    assert_eq!(unknown["omitted_values"], 0);
}

#[test]
fn test_logged_values_are_capped() {
    let (capture, _guard) = capture("warn");

    let log = LogConfig {
        max_logged_values: 1,
        ..LogConfig::default()
    };
    let mut monitor = DataMonitor::builder().log_config(log).build();
    monitor.fit(&reference(), &FeatureKinds::infer()).unwrap();
    monitor.validate(&runtime()).unwrap();

    let unknown = capture
        .events()
        .into_iter()
        .find(|e| e["fields"]["kind"] == "unknown_category")
        .unwrap();
    assert_eq!(unknown["fields"]["values"], "gold");
    assert_eq!(unknown["fields"]["omitted_values"], 1);
}

#[test]
fn test_silent_config_emits_no_warnings() {
    let (capture, _guard) = capture("warn");

    let mut monitor = DataMonitor::builder()
        .log_config(LogConfig::silent())
        .build();
    monitor.fit(&reference(), &FeatureKinds::infer()).unwrap();
    assert!(!monitor.validate(&runtime()).unwrap().is_empty());

    assert!(capture.events().iter().all(|e| e["level"] != "WARN"));
}

#[test]
fn test_fit_emits_info_event() {
    let (capture, _guard) = capture("info");

    let mut monitor = DataMonitor::new();
    monitor.fit(&reference(), &FeatureKinds::infer()).unwrap();

    let fitted = capture
        .events()
        .into_iter()
        .find(|e| e["fields"]["message"] == "Fitted data schema")
        .unwrap();
    assert_eq!(fitted["level"], "INFO");
    assert_eq!(fitted["fields"]["rows"], 2);
    assert_eq!(fitted["fields"]["numeric"], 1);
    assert_eq!(fitted["fields"]["categorical"], 1);
}
