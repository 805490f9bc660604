//! Drift reports: the findings of one validation run plus its context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::finding::{Finding, FindingKind};

/// The outcome of validating one runtime table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Name of the monitor that produced the report
    pub monitor: String,
    /// Fingerprint of the schema the table was validated against
    pub schema_fingerprint: String,
    /// Rows in the runtime table
    pub rows_checked: usize,
    /// Schema features present in the runtime table
    pub features_checked: usize,
    /// Findings in deterministic order
    pub findings: Vec<Finding>,
    /// When validation ran
    pub timestamp: DateTime<Utc>,
}

impl DriftReport {
    /// Returns `true` if any finding was produced.
    pub fn has_drift(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Returns the findings of one kind, in report order.
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Sum of offending rows across drift findings (unseen features excluded).
    pub fn total_violations(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.kind != FindingKind::UnseenFeature)
            .map(|f| f.count)
            .sum()
    }
}
