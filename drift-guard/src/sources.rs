//! Loading feature tables from files.
//!
//! Sources read CSV, Parquet or newline-delimited JSON through DataFusion and
//! collect the result into a [`FeatureTable`]. They are a convenience for
//! batch jobs; the monitor itself never touches the filesystem.
//!
//! # Examples
//!
//! ```rust,no_run
//! use drift_guard::sources::{CsvSource, TableSource};
//!
//! # async fn example() -> drift_guard::error::Result<()> {
//! let reference = CsvSource::new("data/training.csv").load().await?;
//! println!("{} columns", reference.num_columns());
//! # Ok(())
//! # }
//! ```

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::{CsvReadOptions, NdJsonReadOptions, ParquetReadOptions, SessionContext};
use tracing::{info, instrument};

use crate::error::{DriftError, Result};
use crate::table::FeatureTable;

/// Something a feature table can be loaded from.
#[async_trait]
pub trait TableSource: Debug + Send + Sync {
    /// Reads the whole source into memory.
    async fn load(&self) -> Result<FeatureTable>;

    /// Returns a human-readable description of this source.
    fn description(&self) -> String;
}

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
    /// File extension DataFusion expects (default: ".csv")
    pub file_extension: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            schema_infer_max_records: 1000,
            file_extension: ".csv".to_string(),
        }
    }
}

/// A CSV file source.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: String,
    options: CsvOptions,
    limit: Option<usize>,
}

impl CsvSource {
    /// Creates a CSV source with default options.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a CSV source with custom options.
    pub fn with_options(path: impl Into<String>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
            limit: None,
        }
    }

    /// Reads at most `rows` rows.
    pub fn with_limit(mut self, rows: usize) -> Self {
        self.limit = Some(rows);
        self
    }
}

#[async_trait]
impl TableSource for CsvSource {
    #[instrument(skip(self), fields(path = %self.path))]
    async fn load(&self) -> Result<FeatureTable> {
        let ctx = SessionContext::new();
        let options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&self.options.file_extension);

        let df = ctx
            .read_csv(self.path.as_str(), options)
            .await
            .map_err(|e| read_error("CSV", &self.path, e))?;
        collect("CSV", &self.path, df, self.limit).await
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path)
    }
}

/// A Parquet file source.
#[derive(Debug, Clone)]
pub struct ParquetSource {
    path: String,
    limit: Option<usize>,
}

impl ParquetSource {
    /// Creates a Parquet source.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Reads at most `rows` rows.
    pub fn with_limit(mut self, rows: usize) -> Self {
        self.limit = Some(rows);
        self
    }
}

#[async_trait]
impl TableSource for ParquetSource {
    #[instrument(skip(self), fields(path = %self.path))]
    async fn load(&self) -> Result<FeatureTable> {
        let ctx = SessionContext::new();
        let df = ctx
            .read_parquet(self.path.as_str(), ParquetReadOptions::default())
            .await
            .map_err(|e| read_error("Parquet", &self.path, e))?;
        collect("Parquet", &self.path, df, self.limit).await
    }

    fn description(&self) -> String {
        format!("Parquet file: {}", self.path)
    }
}

/// A newline-delimited JSON file source.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: String,
    limit: Option<usize>,
}

impl JsonSource {
    /// Creates a JSON source.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Reads at most `rows` rows.
    pub fn with_limit(mut self, rows: usize) -> Self {
        self.limit = Some(rows);
        self
    }
}

#[async_trait]
impl TableSource for JsonSource {
    #[instrument(skip(self), fields(path = %self.path))]
    async fn load(&self) -> Result<FeatureTable> {
        let ctx = SessionContext::new();
        let extension = Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_else(|| ".json".to_string());
        let options = NdJsonReadOptions::default().file_extension(&extension);
        let df = ctx
            .read_json(self.path.as_str(), options)
            .await
            .map_err(|e| read_error("JSON", &self.path, e))?;
        collect("JSON", &self.path, df, self.limit).await
    }

    fn description(&self) -> String {
        format!("JSON file: {}", self.path)
    }
}

/// Picks a source from the file extension (`.csv`, `.parquet`, `.json`/`.jsonl`).
pub fn open(path: impl AsRef<Path>) -> Result<Box<dyn TableSource>> {
    let path = path.as_ref();
    let display = path
        .to_str()
        .ok_or_else(|| DriftError::Configuration("Path contains invalid UTF-8".to_string()))?
        .to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => Ok(Box::new(CsvSource::new(display))),
        Some("parquet") => Ok(Box::new(ParquetSource::new(display))),
        Some("json") | Some("jsonl") | Some("ndjson") => Ok(Box::new(JsonSource::new(display))),
        _ => Err(DriftError::Configuration(format!(
            "Unsupported file type: {display}"
        ))),
    }
}

fn read_error(
    source_type: &str,
    path: &str,
    error: datafusion::error::DataFusionError,
) -> DriftError {
    DriftError::data_source_with_source(
        source_type,
        format!("failed to read {path}"),
        Box::new(error),
    )
}

async fn collect(
    source_type: &str,
    path: &str,
    df: DataFrame,
    limit: Option<usize>,
) -> Result<FeatureTable> {
    let df = match limit {
        Some(rows) => df.limit(0, Some(rows))?,
        None => df,
    };
    let batches = df
        .collect()
        .await
        .map_err(|e| read_error(source_type, path, e))?;
    let table = FeatureTable::from_batches(&batches)?;

    info!(
        source = source_type,
        path,
        rows = table.check_shape()?,
        columns = table.num_columns(),
        "Loaded feature table"
    );
    Ok(table)
}
