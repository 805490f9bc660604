//! The data monitor: fit a schema on reference data, validate runtime data.
//!
//! # Example
//!
//! ```rust
//! use drift_guard::prelude::*;
//!
//! # fn main() -> drift_guard::error::Result<()> {
//! let reference = FeatureTable::builder()
//!     .column("feature1", ["0", "1", "2"])
//!     .column("feature4", [0.88, 50.0, 99.94])
//!     .build()?;
//!
//! let mut monitor = DataMonitor::new();
//! monitor.fit(&reference, &FeatureKinds::infer().categorical("feature1"))?;
//!
//! let runtime = FeatureTable::builder()
//!     .column("feature1", ["5", "1"])
//!     .column("feature4", [-10.0, 150.0])
//!     .build()?;
//!
//! let findings = monitor.validate(&runtime)?;
//! assert_eq!(
//!     findings,
//!     vec![
//!         Finding::above_max("feature4", 1),
//!         Finding::below_min("feature4", 1),
//!         Finding::unknown_category("feature1", 1, vec!["5".to_string()]),
//!     ]
//! );
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{DriftError, Result};
use crate::finding::Finding;
use crate::inference::KindInferenceEngine;
use crate::kinds::FeatureKinds;
use crate::logging::LogConfig;
use crate::observer::{FindingObserver, TracingObserver};
use crate::report::DriftReport;
use crate::schema::DataSchema;
use crate::table::FeatureTable;
use crate::{log_fit_detail, perf_debug};

/// What to do with runtime columns that were not part of the fitted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnseenFeaturePolicy {
    /// Skip them silently.
    #[default]
    Ignore,
    /// Report each one as an `UnseenFeature` finding.
    Report,
}

/// Configuration for a [`DataMonitor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Name attached to log events and reports
    pub name: String,
    /// Handling of runtime columns absent at fit time
    pub unseen_features: UnseenFeaturePolicy,
    /// Logging behavior
    pub log: LogConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name: "data_monitor".to_string(),
            unseen_features: UnseenFeaturePolicy::default(),
            log: LogConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Sets the monitor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the unseen feature policy.
    pub fn with_unseen_features(mut self, policy: UnseenFeaturePolicy) -> Self {
        self.unseen_features = policy;
        self
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DriftError::Configuration(e.to_string()))
    }
}

/// Lifecycle state of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// No schema yet; `validate` fails with `NotFitted`.
    Unfit,
    /// A schema is present.
    Fit,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Unfit => write!(f, "unfit"),
            MonitorState::Fit => write!(f, "fit"),
        }
    }
}

/// Learns a schema from reference data and validates runtime data against it.
///
/// `validate` takes `&self` and may run concurrently from many threads;
/// `fit` takes `&mut self`, so re-fitting a shared monitor needs exclusive
/// access (see [`SharedMonitor`](crate::pipeline::SharedMonitor)).
pub struct DataMonitor {
    config: MonitorConfig,
    inference: KindInferenceEngine,
    schema: Option<DataSchema>,
    observers: Vec<Arc<dyn FindingObserver>>,
}

impl fmt::Debug for DataMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataMonitor")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for DataMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataMonitor {
    /// Creates an unfitted monitor with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for a monitor.
    pub fn builder() -> DataMonitorBuilder {
        DataMonitorBuilder::default()
    }

    /// Creates a fitted monitor from a previously persisted schema.
    pub fn from_schema(schema: DataSchema) -> Self {
        Self::builder().schema(schema).build()
    }

    /// Returns the monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the current schema, if fitted.
    pub fn schema(&self) -> Option<&DataSchema> {
        self.schema.as_ref()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> MonitorState {
        if self.schema.is_some() {
            MonitorState::Fit
        } else {
            MonitorState::Unfit
        }
    }

    /// Returns `true` once a schema is present.
    pub fn is_fitted(&self) -> bool {
        self.schema.is_some()
    }

    /// Learns a new schema from a reference table, replacing any existing one.
    ///
    /// On error the previous schema (if any) is kept.
    #[instrument(skip_all, fields(monitor = %self.config.name))]
    pub fn fit(&mut self, reference: &FeatureTable, kinds: &FeatureKinds) -> Result<()> {
        reference.check_shape()?;
        let resolved = kinds.resolve(reference, &self.inference)?;
        let schema = DataSchema::learn(reference, &resolved)?;

        for feature in schema.numeric() {
            log_fit_detail!(
                self.config.log,
                feature = %feature.name,
                min = feature.bounds.min,
                max = feature.bounds.max,
                "Learned numeric bounds"
            );
        }
        for feature in schema.categoricals() {
            log_fit_detail!(
                self.config.log,
                feature = %feature.name,
                categories = feature.values.len(),
                "Learned categorical values"
            );
        }

        info!(
            rows = schema.row_count(),
            numeric = schema.numeric().len(),
            categorical = schema.categoricals().len(),
            replaced = self.schema.is_some(),
            "Fitted data schema"
        );

        self.schema = Some(schema);
        Ok(())
    }

    /// Validates a runtime table and returns its findings.
    ///
    /// Drift is reported, never raised: this only fails with `NotFitted` before
    /// the first successful `fit`, or with a shape error for ragged tables.
    #[instrument(skip_all, fields(monitor = %self.config.name))]
    pub fn validate(&self, runtime: &FeatureTable) -> Result<Vec<Finding>> {
        self.check(runtime).map(|checked| checked.findings)
    }

    /// Validates a runtime table and returns a full report.
    #[instrument(skip_all, fields(monitor = %self.config.name))]
    pub fn validate_report(&self, runtime: &FeatureTable) -> Result<DriftReport> {
        let checked = self.check(runtime)?;
        Ok(DriftReport {
            monitor: self.config.name.clone(),
            schema_fingerprint: checked.schema.fingerprint(),
            rows_checked: checked.rows,
            features_checked: checked.features_checked,
            findings: checked.findings,
            timestamp: Utc::now(),
        })
    }

    fn check(&self, runtime: &FeatureTable) -> Result<Checked<'_>> {
        let schema = self.schema.as_ref().ok_or(DriftError::NotFitted)?;
        let rows = runtime.check_shape()?;

        let findings = detect_drift(schema, runtime, rows, self.config.unseen_features);
        let features_checked = runtime
            .column_names()
            .filter(|name| schema.contains(name))
            .count();

        perf_debug!(
            self.config.log,
            rows,
            features_checked,
            findings = findings.len(),
            "Validated runtime table"
        );

        if !findings.is_empty() {
            for observer in &self.observers {
                observer.observe(&self.config.name, &findings);
            }
        }

        Ok(Checked {
            schema,
            rows,
            features_checked,
            findings,
        })
    }
}

/// Outcome of one validation pass, before it is shaped into a report.
struct Checked<'a> {
    schema: &'a DataSchema,
    rows: usize,
    features_checked: usize,
    findings: Vec<Finding>,
}

/// Compares a runtime table against a schema.
///
/// Order: numeric findings (schema order, above-max before below-min), then
/// categorical findings (schema order), then unseen features (table order).
fn detect_drift(
    schema: &DataSchema,
    runtime: &FeatureTable,
    rows: usize,
    unseen: UnseenFeaturePolicy,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for feature in schema.numeric() {
        let Some(values) = runtime.column(&feature.name) else {
            continue;
        };
        let (mut above, mut below) = (0, 0);
        for value in values.iter().filter_map(|v| v.as_f64()) {
            if value > feature.bounds.max {
                above += 1;
            } else if value < feature.bounds.min {
                below += 1;
            }
        }
        if above > 0 {
            findings.push(Finding::above_max(&feature.name, above));
        }
        if below > 0 {
            findings.push(Finding::below_min(&feature.name, below));
        }
    }

    for feature in schema.categoricals() {
        let Some(values) = runtime.column(&feature.name) else {
            continue;
        };
        let mut unknown_count = 0;
        let mut unknown = BTreeSet::new();
        for value in values.iter().filter_map(|v| v.canonical()) {
            if !feature.values.contains(&value) {
                unknown_count += 1;
                unknown.insert(value);
            }
        }
        if unknown_count > 0 {
            findings.push(Finding::unknown_category(
                &feature.name,
                unknown_count,
                unknown,
            ));
        }
    }

    if unseen == UnseenFeaturePolicy::Report {
        findings.extend(
            runtime
                .column_names()
                .filter(|name| !schema.contains(name))
                .map(|name| Finding::unseen_feature(name, rows)),
        );
    }

    findings
}

/// Builder for [`DataMonitor`].
#[derive(Default)]
pub struct DataMonitorBuilder {
    config: MonitorConfig,
    inference: Option<KindInferenceEngine>,
    schema: Option<DataSchema>,
    observers: Vec<Arc<dyn FindingObserver>>,
    tracing_observer: Option<bool>,
}

impl DataMonitorBuilder {
    /// Sets the whole configuration.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the monitor name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the unseen feature policy.
    pub fn unseen_features(mut self, policy: UnseenFeaturePolicy) -> Self {
        self.config.unseen_features = policy;
        self
    }

    /// Sets the logging configuration.
    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Sets the engine used for columns whose kind is inferred.
    pub fn inference(mut self, engine: KindInferenceEngine) -> Self {
        self.inference = Some(engine);
        self
    }

    /// Starts the monitor in the fitted state with `schema`.
    pub fn schema(mut self, schema: DataSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Adds an observer notified of every batch of findings.
    pub fn observer(mut self, observer: Arc<dyn FindingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Overrides whether findings are logged through `tracing`.
    ///
    /// Defaults to `LogConfig::log_findings`.
    pub fn tracing_observer(mut self, enabled: bool) -> Self {
        self.tracing_observer = Some(enabled);
        self
    }

    /// Builds the monitor.
    pub fn build(self) -> DataMonitor {
        let mut observers = Vec::with_capacity(self.observers.len() + 1);
        if self
            .tracing_observer
            .unwrap_or(self.config.log.log_findings)
        {
            let tracing: Arc<dyn FindingObserver> =
                Arc::new(TracingObserver::new(&self.config.log));
            observers.push(tracing);
        }
        observers.extend(self.observers);

        DataMonitor {
            config: self.config,
            inference: self.inference.unwrap_or_default(),
            schema: self.schema,
            observers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingKind;
    use crate::kinds::FeatureKind;
    use crate::observer::CollectingObserver;
    use crate::table::Value;

    fn reference() -> FeatureTable {
        FeatureTable::builder()
            .column("feature1", ["0", "1", "2", "3", "4"])
            .column("feature4", [0.88, 50.0, 99.94, 12.5, 70.0])
            .build()
            .unwrap()
    }

    fn kinds() -> FeatureKinds {
        FeatureKinds::infer().categorical("feature1")
    }

    fn fitted() -> DataMonitor {
        let mut monitor = DataMonitor::builder().tracing_observer(false).build();
        monitor.fit(&reference(), &kinds()).unwrap();
        monitor
    }

    #[test]
    fn test_validate_before_fit() {
        let monitor = DataMonitor::new();
        assert_eq!(monitor.state(), MonitorState::Unfit);
        let err = monitor.validate(&reference()).unwrap_err();
        assert!(matches!(err, DriftError::NotFitted));
    }

    #[test]
    fn test_fit_transitions_state() {
        let monitor = fitted();
        assert_eq!(monitor.state(), MonitorState::Fit);
        assert_eq!(
            monitor.schema().unwrap().kind_of("feature1"),
            Some(FeatureKind::Categorical)
        );
    }

    #[test]
    fn test_detects_all_kinds_in_order() {
        let runtime = FeatureTable::builder()
            .column("feature1", ["5", "1"])
            .column("feature4", [-10.0, 150.0])
            .build()
            .unwrap();

        let findings = fitted().validate(&runtime).unwrap();
        assert_eq!(
            findings,
            vec![
                Finding::above_max("feature4", 1),
                Finding::below_min("feature4", 1),
                Finding::unknown_category("feature1", 1, vec!["5".to_string()]),
            ]
        );
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let runtime = FeatureTable::builder()
            .column("feature1", [Value::Null, Value::Text("2".into())])
            .column("feature4", [Value::Null, Value::Text("oops".into())])
            .build()
            .unwrap();
        assert!(fitted().validate(&runtime).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_runtime_table() {
        let runtime = FeatureTable::builder()
            .column("feature1", ["1", "2"])
            .column("feature4", [1.0])
            .build()
            .unwrap();
        let err = fitted().validate(&runtime).unwrap_err();
        assert!(matches!(err, DriftError::Shape { .. }));
    }

    #[test]
    fn test_failed_fit_keeps_schema() {
        let mut monitor = fitted();
        let before = monitor.schema().unwrap().fingerprint();

        let err = monitor.fit(&FeatureTable::new(), &kinds()).unwrap_err();
        assert!(matches!(err, DriftError::Schema { .. }));
        assert_eq!(monitor.schema().unwrap().fingerprint(), before);
    }

    #[test]
    fn test_unseen_feature_policy() {
        let runtime = FeatureTable::builder()
            .column("feature4", [1.0, 2.0])
            .column("new_col", ["a", "b"])
            .build()
            .unwrap();

        assert!(fitted().validate(&runtime).unwrap().is_empty());

        let mut monitor = DataMonitor::builder()
            .tracing_observer(false)
            .unseen_features(UnseenFeaturePolicy::Report)
            .build();
        monitor.fit(&reference(), &kinds()).unwrap();
        let findings = monitor.validate(&runtime).unwrap();
        assert_eq!(findings, vec![Finding::unseen_feature("new_col", 2)]);
    }

    #[test]
    fn test_observers_receive_findings() {
        let collector = Arc::new(CollectingObserver::new());
        let mut monitor = DataMonitor::builder()
            .tracing_observer(false)
            .observer(collector.clone())
            .build();
        monitor.fit(&reference(), &kinds()).unwrap();

        monitor.validate(&reference()).unwrap();
        assert!(collector.findings().is_empty());

        let runtime = FeatureTable::builder()
            .column("feature4", [1000.0])
            .build()
            .unwrap();
        monitor.validate(&runtime).unwrap();
        assert_eq!(collector.findings()[0].kind, FindingKind::AboveMax);
    }

    #[test]
    fn test_validate_report_context() {
        let monitor = fitted();
        let runtime = FeatureTable::builder()
            .column("feature4", [1.0, 2.0, 3.0])
            .column("other", [1, 2, 3])
            .build()
            .unwrap();
        let report = monitor.validate_report(&runtime).unwrap();

        assert_eq!(report.monitor, "data_monitor");
        assert_eq!(report.rows_checked, 3);
        assert_eq!(report.features_checked, 1);
        assert_eq!(
            report.schema_fingerprint,
            monitor.schema().unwrap().fingerprint()
        );
        assert!(!report.has_drift());
    }

    #[test]
    fn test_validate_matches_report_and_notifies_once() {
        let collector = Arc::new(CollectingObserver::new());
        let mut monitor = DataMonitor::builder()
            .tracing_observer(false)
            .observer(collector.clone())
            .build();
        monitor.fit(&reference(), &kinds()).unwrap();

        let runtime = FeatureTable::builder()
            .column("feature1", ["9"])
            .column("feature4", [1000.0])
            .build()
            .unwrap();
        let findings = monitor.validate(&runtime).unwrap();
        assert_eq!(collector.findings().len(), 2);

        let report = monitor.validate_report(&runtime).unwrap();
        assert_eq!(report.findings, findings);
        assert_eq!(collector.findings().len(), 4);
    }

    #[test]
    fn test_from_schema_is_fitted() {
        let schema = fitted().schema().unwrap().clone();
        let monitor = DataMonitor::from_schema(schema);
        assert!(monitor.is_fitted());
    }

    #[test]
    fn test_monitor_config_from_json() {
        let config =
            MonitorConfig::from_json(r#"{"name": "churn_model", "unseen_features": "report"}"#)
                .unwrap();
        assert_eq!(config.name, "churn_model");
        assert_eq!(config.unseen_features, UnseenFeaturePolicy::Report);

        let config = MonitorConfig::from_json("{}").unwrap();
        assert_eq!(config.unseen_features, UnseenFeaturePolicy::Ignore);
        assert_eq!(config.log.max_logged_values, LogConfig::default().max_logged_values);

        assert!(matches!(
            MonitorConfig::from_json("[1]"),
            Err(DriftError::Configuration(_))
        ));
    }

    #[test]
    fn test_monitor_config_carries_log_settings() {
        let config = MonitorConfig::from_json(
            r#"{"log": {"base_level": "debug", "log_findings": false, "max_logged_values": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.log.base_level, tracing::Level::DEBUG);
        assert!(!config.log.log_findings);
        assert_eq!(config.log.max_logged_values, 5);
        assert_eq!(config.log.max_field_length, LogConfig::default().max_field_length);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""base_level":"debug""#));
        let back = MonitorConfig::from_json(&json).unwrap();
        assert_eq!(back.log.base_level, tracing::Level::DEBUG);

        assert!(matches!(
            MonitorConfig::from_json(r#"{"log": {"base_level": "loud"}}"#),
            Err(DriftError::Configuration(_))
        ));
    }
}
