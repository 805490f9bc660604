//! Structured drift findings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of deviation a finding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Numeric values strictly greater than the fitted maximum
    AboveMax,
    /// Numeric values strictly less than the fitted minimum
    BelowMin,
    /// Categorical values never seen at fit time
    UnknownCategory,
    /// A runtime column that was not part of the fitted schema
    UnseenFeature,
}

impl FindingKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::AboveMax => "above_max",
            FindingKind::BelowMin => "below_min",
            FindingKind::UnknownCategory => "unknown_category",
            FindingKind::UnseenFeature => "unseen_feature",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One feature's deviation from the fitted schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// What kind of deviation was found
    pub kind: FindingKind,
    /// The feature the deviation was found in
    pub feature: String,
    /// Number of offending rows
    pub count: usize,
    /// Sorted distinct unknown values (only for `UnknownCategory`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distinct_unknown_values: Vec<String>,
}

impl Finding {
    /// Values above the fitted maximum.
    pub fn above_max(feature: impl Into<String>, count: usize) -> Self {
        Self::new(FindingKind::AboveMax, feature, count)
    }

    /// Values below the fitted minimum.
    pub fn below_min(feature: impl Into<String>, count: usize) -> Self {
        Self::new(FindingKind::BelowMin, feature, count)
    }

    /// Categories not seen at fit time. `values` is sorted and deduplicated.
    pub fn unknown_category(
        feature: impl Into<String>,
        count: usize,
        values: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut values: Vec<String> = values.into_iter().collect();
        values.sort();
        values.dedup();
        Self {
            distinct_unknown_values: values,
            ..Self::new(FindingKind::UnknownCategory, feature, count)
        }
    }

    /// A runtime feature missing from the fitted schema.
    pub fn unseen_feature(feature: impl Into<String>, rows: usize) -> Self {
        Self::new(FindingKind::UnseenFeature, feature, rows)
    }

    fn new(kind: FindingKind, feature: impl Into<String>, count: usize) -> Self {
        Self {
            kind,
            feature: feature.into(),
            count,
            distinct_unknown_values: Vec::new(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FindingKind::AboveMax => write!(
                f,
                "{}: feature '{}' has {} value(s) above the fitted maximum",
                self.kind, self.feature, self.count
            ),
            FindingKind::BelowMin => write!(
                f,
                "{}: feature '{}' has {} value(s) below the fitted minimum",
                self.kind, self.feature, self.count
            ),
            FindingKind::UnknownCategory => write!(
                f,
                "{}: feature '{}' has {} value(s) in unknown categories [{}]",
                self.kind,
                self.feature,
                self.count,
                self.distinct_unknown_values.join(", ")
            ),
            FindingKind::UnseenFeature => write!(
                f,
                "{}: feature '{}' ({} rows) was not present at fit time",
                self.kind, self.feature, self.count
            ),
        }
    }
}
