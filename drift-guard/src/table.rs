//! In-memory feature tables.
//!
//! A [`FeatureTable`] is an ordered collection of named columns. Each column is
//! a sequence of [`Value`]s; whether a column is treated as numeric or
//! categorical is decided when a monitor is fitted, not by the table itself.
//!
//! Tables can be built by hand or converted from Arrow record batches:
//!
//! ```rust
//! use drift_guard::table::{FeatureTable, Value};
//!
//! let table = FeatureTable::builder()
//!     .column("feature1", ["0", "1", "2"])
//!     .column("feature4", [0.88, 50.0, 99.94])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.num_columns(), 2);
//! assert_eq!(table.check_shape().unwrap(), 3);
//! assert_eq!(table.column("feature4").unwrap()[0], Value::Float(0.88));
//! ```

use std::collections::HashSet;
use std::fmt;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int64Type, UInt64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};

/// A single cell of a feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
}

impl Value {
    /// Returns `true` for `Null` and NaN floats.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Converts the value to a real number.
    ///
    /// Integers and finite floats convert directly; text converts when its
    /// trimmed content parses as a finite `f64`. Everything else, including
    /// infinities and text such as `"1e400"` that overflows, is non-comparable.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f).filter(|f| f.is_finite()),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Returns the canonical string form used for categorical comparison.
    ///
    /// Missing values have no canonical form.
    pub fn canonical(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.is_nan() => None,
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "null"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(widen_f32(v))
    }
}

/// Widens an `f32` to the `f64` with the same shortest decimal form, so `0.1f32`
/// becomes `0.1` rather than `0.10000000149011612`.
fn widen_f32(v: f32) -> f64 {
    v.to_string().parse().unwrap_or(f64::from(v))
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A named column of a feature table.
#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Value>,
}

/// An ordered collection of named feature columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<Column>,
}

impl FeatureTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a table.
    pub fn builder() -> FeatureTableBuilder {
        FeatureTableBuilder::default()
    }

    /// Creates a table from `(name, values)` pairs, rejecting duplicate names.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Appends a column. Fails with a shape error if the name is already present.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.iter().any(|c| c.name == name) {
            return Err(DriftError::shape(format!("duplicate column '{name}'")));
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the values of the named column.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Returns the column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Iterates over `(name, values)` pairs in table order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.values.as_slice()))
    }

    /// Verifies every column has the same length and returns the row count.
    ///
    /// A table with no columns has zero rows.
    pub fn check_shape(&self) -> Result<usize> {
        let Some(first) = self.columns.first() else {
            return Ok(0);
        };
        let expected = first.values.len();
        for column in &self.columns[1..] {
            if column.values.len() != expected {
                return Err(DriftError::shape(format!(
                    "column '{}' has {} rows, expected {} (from column '{}')",
                    column.name,
                    column.values.len(),
                    expected,
                    first.name
                )));
            }
        }
        Ok(expected)
    }

    /// Converts a sequence of record batches sharing one schema into a table.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Ok(Self::new());
        };
        let schema = first.schema();

        let mut columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|field| Column {
                name: field.name().clone(),
                values: Vec::new(),
            })
            .collect();

        for batch in batches {
            let batch_schema = batch.schema();
            let same_names = batch_schema.fields().len() == columns.len()
                && batch_schema
                    .fields()
                    .iter()
                    .zip(&columns)
                    .all(|(field, column)| field.name() == &column.name);
            if !same_names {
                return Err(DriftError::shape(
                    "record batches do not share the same columns",
                ));
            }

            for (column, array) in columns.iter_mut().zip(batch.columns()) {
                column.values.extend(array_values(array)?);
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DriftError::shape(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }
}

impl TryFrom<&RecordBatch> for FeatureTable {
    type Error = DriftError;

    fn try_from(batch: &RecordBatch) -> Result<Self> {
        Self::from_batches(std::slice::from_ref(batch))
    }
}

/// Extracts the values of an Arrow array as feature table cells.
fn array_values(array: &ArrayRef) -> Result<Vec<Value>> {
    let len = array.len();
    let values = match array.data_type() {
        DataType::Null => vec![Value::Null; len],
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map(Value::Bool).unwrap_or(Value::Null))
            .collect(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let widened = cast(array, &DataType::Int64)?;
            widened
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(Value::Int).unwrap_or(Value::Null))
                .collect()
        }
        DataType::UInt64 => array
            .as_primitive::<UInt64Type>()
            .iter()
            .map(|v| match v {
                Some(v) => i64::try_from(v)
                    .map(Value::Int)
                    .unwrap_or(Value::Float(v as f64)),
                None => Value::Null,
            })
            .collect(),
        DataType::Float16 | DataType::Float32 => {
            let single = cast(array, &DataType::Float32)?;
            single
                .as_primitive::<Float32Type>()
                .iter()
                .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                .collect()
        }
        DataType::Float64 => array
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
            .collect(),
        DataType::Utf8 => array
            .as_string::<i32>()
            .iter()
            .map(Value::from)
            .collect(),
        DataType::LargeUtf8 => array
            .as_string::<i64>()
            .iter()
            .map(Value::from)
            .collect(),
        DataType::Utf8View => array.as_string_view().iter().map(Value::from).collect(),
        _ => {
            // Dates, decimals, dictionaries and the like fall back to their display form.
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            (0..len)
                .map(|i| {
                    if array.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(values)
}

/// Builder for [`FeatureTable`].
#[derive(Debug, Default)]
pub struct FeatureTableBuilder {
    columns: Vec<(String, Vec<Value>)>,
}

impl FeatureTableBuilder {
    /// Adds a column from any iterator of values convertible into [`Value`].
    pub fn column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Builds the table, rejecting duplicate column names.
    pub fn build(self) -> Result<FeatureTable> {
        FeatureTable::from_columns(self.columns)
    }
}
