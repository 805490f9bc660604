//! Delivery of findings to the outside world.
//!
//! The monitor returns findings as values and hands each batch to its
//! observers. [`TracingObserver`] turns them into structured `WARN` events for
//! whatever `tracing` subscriber the application installed; other sinks
//! (alerting queues, metrics) implement [`FindingObserver`] themselves.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::finding::{Finding, FindingKind};
use crate::logging::{truncate_field, LogConfig};

/// Receives the findings of every `validate` call.
///
/// Observers run on the validating thread and must not fail; an observer that
/// ships findings elsewhere should queue and return.
pub trait FindingObserver: Send + Sync {
    /// Called once per `validate` call that produced findings.
    fn observe(&self, monitor: &str, findings: &[Finding]);
}

/// Emits one `WARN` event per finding.
///
/// Event fields: `monitor`, `kind`, `feature`, `count` and, for unknown
/// categories, `values` (sorted, comma separated) plus `omitted_values` when
/// the list was cut at `max_logged_values`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    max_logged_values: usize,
    max_field_length: usize,
}

impl TracingObserver {
    /// Creates an observer using the limits of `config`.
    pub fn new(config: &LogConfig) -> Self {
        Self {
            max_logged_values: config.max_logged_values,
            max_field_length: config.max_field_length,
        }
    }

    /// Renders the value list of a finding and the number of values left out.
    fn render_values(&self, finding: &Finding) -> (String, usize) {
        let values = &finding.distinct_unknown_values;
        let shown = values.len().min(self.max_logged_values);
        let joined = values[..shown].join(", ");
        (
            truncate_field(&joined, self.max_field_length),
            values.len() - shown,
        )
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(&LogConfig::default())
    }
}

impl FindingObserver for TracingObserver {
    fn observe(&self, monitor: &str, findings: &[Finding]) {
        for finding in findings {
            let feature = truncate_field(&finding.feature, self.max_field_length);
            if finding.kind == FindingKind::UnknownCategory {
                let (values, omitted) = self.render_values(finding);
                warn!(
                    monitor,
                    kind = %finding.kind,
                    feature = %feature,
                    count = finding.count,
                    values = %values,
                    omitted_values = omitted,
                    "Feature {} has {} value(s) in unknown categories: [{}]",
                    feature,
                    finding.count,
                    values
                );
            } else {
                warn!(
                    monitor,
                    kind = %finding.kind,
                    feature = %feature,
                    count = finding.count,
                    "{}",
                    finding
                );
            }
        }
    }
}

/// Keeps every observed finding in memory.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    findings: Mutex<Vec<Finding>>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything observed so far.
    pub fn findings(&self) -> Vec<Finding> {
        self.findings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns everything observed so far.
    pub fn drain(&self) -> Vec<Finding> {
        std::mem::take(
            &mut *self
                .findings
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl FindingObserver for CollectingObserver {
    fn observe(&self, _monitor: &str, findings: &[Finding]) {
        self.findings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(findings);
    }
}
