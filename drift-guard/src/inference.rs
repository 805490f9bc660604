//! Feature kind inference.
//!
//! This helper sits outside the monitor's fit/validate contract: callers that
//! know their feature kinds should pass them explicitly through
//! [`FeatureKinds`](crate::kinds::FeatureKinds). A column is inferred as
//! numeric when every present value converts to a real number, and as
//! categorical otherwise.
//!
//! # Example
//!
//! ```rust
//! use drift_guard::inference::KindInferenceEngine;
//! use drift_guard::kinds::FeatureKind;
//! use drift_guard::table::Value;
//!
//! let engine = KindInferenceEngine::builder().sample_size(100).build();
//! let values = vec![Value::from("1.5"), Value::Null, Value::from(3)];
//! let result = engine.infer_column(&values);
//!
//! assert_eq!(result.kind, FeatureKind::Numeric);
//! assert_eq!(result.missing_count, 1);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::kinds::FeatureKind;
use crate::table::{FeatureTable, Value};

static NUMERIC_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("numeric pattern is valid")
});

/// Configuration for the kind inference engine
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    /// Number of leading rows to inspect; `None` inspects every row
    pub sample_size: Option<usize>,
}

/// Kind inference result for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindInferenceResult {
    /// The inferred kind
    pub kind: FeatureKind,
    /// Number of values inspected
    pub samples_analyzed: usize,
    /// Number of missing values encountered
    pub missing_count: usize,
    /// Number of present values that converted to a real number
    pub numeric_matches: usize,
}

/// Builder for KindInferenceEngine
#[derive(Debug, Default)]
pub struct KindInferenceEngineBuilder {
    config: InferenceConfig,
}

impl KindInferenceEngineBuilder {
    /// Limit inference to the first `size` rows of each column
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = Some(size);
        self
    }

    /// Build the KindInferenceEngine
    pub fn build(self) -> KindInferenceEngine {
        KindInferenceEngine {
            config: self.config,
        }
    }
}

/// Infers numeric vs categorical kinds from column values
#[derive(Debug, Clone, Default)]
pub struct KindInferenceEngine {
    config: InferenceConfig,
}

impl KindInferenceEngine {
    /// Create a new builder for KindInferenceEngine
    pub fn builder() -> KindInferenceEngineBuilder {
        KindInferenceEngineBuilder::default()
    }

    /// Create a KindInferenceEngine that inspects every row
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Infer the kind of a single column
    pub fn infer_column(&self, values: &[Value]) -> KindInferenceResult {
        let limit = self.config.sample_size.unwrap_or(values.len());
        let samples = &values[..limit.min(values.len())];

        let mut missing_count = 0;
        let mut numeric_matches = 0;
        for value in samples {
            if value.is_missing() {
                missing_count += 1;
            } else if Self::is_numeric(value) {
                numeric_matches += 1;
            }
        }

        let present = samples.len() - missing_count;
        // An all-missing column has nothing to bound, so it is categorical.
        let kind = if present > 0 && numeric_matches == present {
            FeatureKind::Numeric
        } else {
            FeatureKind::Categorical
        };

        KindInferenceResult {
            kind,
            samples_analyzed: samples.len(),
            missing_count,
            numeric_matches,
        }
    }

    /// Infer the kind of every column, in table order
    #[instrument(skip(self, table), fields(columns = table.num_columns()))]
    pub fn infer_table(&self, table: &FeatureTable) -> Vec<(String, KindInferenceResult)> {
        table
            .columns()
            .map(|(name, values)| {
                let result = self.infer_column(values);
                debug!(
                    column = name,
                    kind = %result.kind,
                    samples = result.samples_analyzed,
                    missing = result.missing_count,
                    "Inferred feature kind"
                );
                (name.to_string(), result)
            })
            .collect()
    }

    /// Agrees with [`Value::as_f64`], so every value counted here can be bounded.
    fn is_numeric(value: &Value) -> bool {
        match value {
            Value::Text(s) => NUMERIC_TEXT.is_match(s.trim()) && value.as_f64().is_some(),
            Value::Bool(_) => false,
            _ => value.as_f64().is_some(),
        }
    }
}
