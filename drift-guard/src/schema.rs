//! The learned data schema.
//!
//! A [`DataSchema`] summarizes a reference table: min/max bounds for numeric
//! features and the set of observed canonical values for categorical features.
//! It is immutable once learned; a monitor replaces it wholesale on re-fit.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DriftError, Result};
use crate::kinds::FeatureKind;
use crate::table::FeatureTable;

/// Inclusive bounds learned for a numeric feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    /// Smallest present reference value
    pub min: f64,
    /// Largest present reference value
    pub max: f64,
}

impl NumericBounds {
    /// Returns `true` if `value` lies within the bounds, inclusive.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A numeric feature and its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericFeature {
    /// Feature name
    pub name: String,
    /// Learned bounds
    pub bounds: NumericBounds,
}

/// A categorical feature and its observed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalFeature {
    /// Feature name
    pub name: String,
    /// Distinct canonical values seen in the reference table
    pub values: BTreeSet<String>,
}

/// Per-feature statistical summary of a reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    numeric: Vec<NumericFeature>,
    categoricals: Vec<CategoricalFeature>,
    row_count: usize,
    fitted_at: DateTime<Utc>,
}

impl DataSchema {
    /// Learns a schema from a reference table and resolved feature kinds.
    ///
    /// `kinds` must name columns of `table`; features keep the order given.
    pub fn learn(table: &FeatureTable, kinds: &[(String, FeatureKind)]) -> Result<Self> {
        let row_count = table.check_shape()?;
        if table.is_empty() {
            return Err(DriftError::schema("reference table has zero columns"));
        }
        if row_count == 0 {
            return Err(DriftError::schema("reference table has zero rows"));
        }
        if kinds.is_empty() {
            return Err(DriftError::schema(
                "no reference columns were selected for monitoring",
            ));
        }

        let mut numeric = Vec::new();
        let mut categoricals = Vec::new();

        for (name, kind) in kinds {
            let values = table.column(name).ok_or_else(|| {
                DriftError::schema(format!("feature '{name}' is not in the reference table"))
            })?;

            match kind {
                FeatureKind::Numeric => {
                    let mut present = values.iter().filter_map(|v| v.as_f64());
                    let first = present.next().ok_or_else(|| {
                        DriftError::schema(format!(
                            "numeric feature '{name}' has no numeric values"
                        ))
                    })?;
                    let bounds = present.fold(
                        NumericBounds {
                            min: first,
                            max: first,
                        },
                        |acc, v| NumericBounds {
                            min: acc.min.min(v),
                            max: acc.max.max(v),
                        },
                    );
                    numeric.push(NumericFeature {
                        name: name.clone(),
                        bounds,
                    });
                }
                FeatureKind::Categorical => {
                    let values = values.iter().filter_map(|v| v.canonical()).collect();
                    categoricals.push(CategoricalFeature {
                        name: name.clone(),
                        values,
                    });
                }
            }
        }

        Ok(Self {
            numeric,
            categoricals,
            row_count,
            fitted_at: Utc::now(),
        })
    }

    /// Numeric features in schema order.
    pub fn numeric(&self) -> &[NumericFeature] {
        &self.numeric
    }

    /// Categorical features in schema order.
    pub fn categoricals(&self) -> &[CategoricalFeature] {
        &self.categoricals
    }

    /// Returns the bounds of a numeric feature.
    pub fn numeric_bounds(&self, feature: &str) -> Option<&NumericBounds> {
        self.numeric
            .iter()
            .find(|f| f.name == feature)
            .map(|f| &f.bounds)
    }

    /// Returns the observed values of a categorical feature.
    pub fn categories(&self, feature: &str) -> Option<&BTreeSet<String>> {
        self.categoricals
            .iter()
            .find(|f| f.name == feature)
            .map(|f| &f.values)
    }

    /// Returns the kind a feature was fitted as.
    pub fn kind_of(&self, feature: &str) -> Option<FeatureKind> {
        if self.numeric_bounds(feature).is_some() {
            Some(FeatureKind::Numeric)
        } else if self.categories(feature).is_some() {
            Some(FeatureKind::Categorical)
        } else {
            None
        }
    }

    /// Returns `true` if the feature is part of the schema.
    pub fn contains(&self, feature: &str) -> bool {
        self.kind_of(feature).is_some()
    }

    /// Number of monitored features.
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categoricals.len()
    }

    /// Returns `true` if the schema monitors no features.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows in the reference table.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// When the schema was learned.
    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    /// Hex SHA-256 over the bounds and value sets.
    ///
    /// Two schemas learned from equivalent data share a fingerprint regardless
    /// of when they were fitted.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for feature in &self.numeric {
            hasher.update(b"n\0");
            hasher.update(feature.name.as_bytes());
            hasher.update(b"\0");
            hasher.update(feature.bounds.min.to_le_bytes());
            hasher.update(feature.bounds.max.to_le_bytes());
        }
        for feature in &self.categoricals {
            hasher.update(b"c\0");
            hasher.update(feature.name.as_bytes());
            for value in &feature.values {
                hasher.update(b"\0");
                hasher.update(value.as_bytes());
            }
            hasher.update(b"\x01");
        }
        hex::encode(hasher.finalize())
    }

    /// Serializes the schema to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores a schema from JSON, checking its invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(json)?;
        schema.check_invariants()?;
        Ok(schema)
    }

    fn check_invariants(&self) -> Result<()> {
        let mut names = HashSet::new();
        for name in self
            .numeric
            .iter()
            .map(|f| &f.name)
            .chain(self.categoricals.iter().map(|f| &f.name))
        {
            if !names.insert(name) {
                return Err(DriftError::schema(format!(
                    "feature '{name}' appears more than once"
                )));
            }
        }
        for feature in &self.numeric {
            let NumericBounds { min, max } = feature.bounds;
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(DriftError::schema(format!(
                    "numeric feature '{}' has invalid bounds [{min}, {max}]",
                    feature.name
                )));
            }
        }
        if self.is_empty() {
            return Err(DriftError::schema("schema monitors no features"));
        }
        Ok(())
    }
}
