//! Feature kinds and their resolution at fit time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};
use crate::inference::KindInferenceEngine;
use crate::table::FeatureTable;

/// How a feature is summarized and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Validated against learned min/max bounds.
    Numeric,
    /// Validated against the learned set of canonical values.
    Categorical,
}

impl FeatureKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Numeric => "numeric",
            FeatureKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do with reference columns that have no explicit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlistedColumns {
    /// Infer the kind from the column's values.
    #[default]
    Infer,
    /// Leave the column out of the schema.
    Skip,
}

/// Per-feature kind assignment used by `fit`.
///
/// # Examples
///
/// ```rust
/// use drift_guard::kinds::{FeatureKind, FeatureKinds};
///
/// // Everything inferred except one column pinned to categorical
/// let kinds = FeatureKinds::infer().categorical("zip_code");
/// assert_eq!(kinds.explicit_kind("zip_code"), Some(FeatureKind::Categorical));
///
/// // Only the listed columns are monitored
/// let kinds = FeatureKinds::explicit_only()
///     .numeric("age")
///     .categorical("country");
/// assert_eq!(kinds.explicit_kind("income"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureKinds {
    #[serde(default)]
    explicit: BTreeMap<String, FeatureKind>,
    #[serde(default)]
    unlisted: UnlistedColumns,
}

impl FeatureKinds {
    /// Infers the kind of every column.
    pub fn infer() -> Self {
        Self::default()
    }

    /// Monitors only columns given an explicit kind.
    pub fn explicit_only() -> Self {
        Self {
            explicit: BTreeMap::new(),
            unlisted: UnlistedColumns::Skip,
        }
    }

    /// Assigns a kind to a feature.
    pub fn with(mut self, feature: impl Into<String>, kind: FeatureKind) -> Self {
        self.explicit.insert(feature.into(), kind);
        self
    }

    /// Marks a feature as numeric.
    pub fn numeric(self, feature: impl Into<String>) -> Self {
        self.with(feature, FeatureKind::Numeric)
    }

    /// Marks a feature as categorical.
    pub fn categorical(self, feature: impl Into<String>) -> Self {
        self.with(feature, FeatureKind::Categorical)
    }

    /// Sets the rule for columns without an explicit kind.
    pub fn with_unlisted(mut self, unlisted: UnlistedColumns) -> Self {
        self.unlisted = unlisted;
        self
    }

    /// Returns the explicit kind assigned to a feature, if any.
    pub fn explicit_kind(&self, feature: &str) -> Option<FeatureKind> {
        self.explicit.get(feature).copied()
    }

    /// Returns the rule for columns without an explicit kind.
    pub fn unlisted(&self) -> UnlistedColumns {
        self.unlisted
    }

    /// Resolves the kind of every monitored column, in table order.
    ///
    /// Fails with a schema error if an explicit kind names a column the table
    /// does not have.
    pub fn resolve(
        &self,
        table: &FeatureTable,
        engine: &KindInferenceEngine,
    ) -> Result<Vec<(String, FeatureKind)>> {
        if let Some(missing) = self
            .explicit
            .keys()
            .find(|name| table.column(name).is_none())
        {
            return Err(DriftError::schema(format!(
                "feature '{missing}' has an explicit kind but is not in the reference table"
            )));
        }

        let mut resolved = Vec::with_capacity(table.num_columns());
        for (name, values) in table.columns() {
            let kind = match (self.explicit_kind(name), self.unlisted) {
                (Some(kind), _) => kind,
                (None, UnlistedColumns::Infer) => engine.infer_column(values).kind,
                (None, UnlistedColumns::Skip) => continue,
            };
            resolved.push((name.to_string(), kind));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FeatureTable {
        FeatureTable::builder()
            .column("age", [21.0, 35.0, 60.0])
            .column("country", ["DE", "FR", "DE"])
            .column("zip", ["10115", "75001", "10115"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_infers_in_table_order() {
        let resolved = FeatureKinds::infer()
            .resolve(&table(), &KindInferenceEngine::new())
            .unwrap();
        assert_eq!(
            resolved,
            vec![
                ("age".to_string(), FeatureKind::Numeric),
                ("country".to_string(), FeatureKind::Categorical),
                ("zip".to_string(), FeatureKind::Numeric),
            ]
        );
    }

    #[test]
    fn test_explicit_kind_overrides_inference() {
        let resolved = FeatureKinds::infer()
            .categorical("zip")
            .resolve(&table(), &KindInferenceEngine::new())
            .unwrap();
        assert_eq!(resolved[2], ("zip".to_string(), FeatureKind::Categorical));
    }

    #[test]
    fn test_explicit_only_skips_unlisted() {
        let resolved = FeatureKinds::explicit_only()
            .numeric("age")
            .resolve(&table(), &KindInferenceEngine::new())
            .unwrap();
        assert_eq!(resolved, vec![("age".to_string(), FeatureKind::Numeric)]);
    }

    #[test]
    fn test_explicit_kind_for_absent_column() {
        let err = FeatureKinds::infer()
            .numeric("income")
            .resolve(&table(), &KindInferenceEngine::new())
            .unwrap_err();
        assert!(matches!(err, DriftError::Schema { .. }));
        assert!(err.to_string().contains("income"));
    }

    #[test]
    fn test_feature_kinds_serde() {
        let kinds: FeatureKinds =
            serde_json::from_str(r#"{"explicit": {"age": "numeric"}, "unlisted": "skip"}"#)
                .unwrap();
        assert_eq!(kinds.explicit_kind("age"), Some(FeatureKind::Numeric));
        assert_eq!(kinds.unlisted(), UnlistedColumns::Skip);
    }
}
