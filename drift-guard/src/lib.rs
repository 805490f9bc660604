//! # drift-guard - runtime data-drift monitoring
//!
//! drift-guard learns a statistical schema from the data a model was trained
//! on and checks every batch of serving data against it. Numeric features are
//! summarized by their min/max bounds, categorical features by the set of
//! values seen at training time. Deviations come back as structured
//! [`Finding`](finding::Finding)s and are logged as `WARN` events; they never
//! fail the serving path.
//!
//! ## Quick Start
//!
//! ```rust
//! use drift_guard::prelude::*;
//!
//! # fn main() -> drift_guard::error::Result<()> {
//! // Train time: learn the schema
//! let training = FeatureTable::builder()
//!     .column("age", [23.0, 41.0, 67.0])
//!     .column("plan", ["basic", "premium", "basic"])
//!     .build()?;
//!
//! let mut monitor = DataMonitor::builder().name("churn_model").build();
//! monitor.fit(&training, &FeatureKinds::infer())?;
//!
//! // Predict time: validate each request batch
//! let request = FeatureTable::builder()
//!     .column("age", [17.0, 30.0])
//!     .column("plan", ["enterprise", "basic"])
//!     .build()?;
//!
//! for finding in monitor.validate(&request)? {
//!     println!("{finding}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`monitor`**: [`DataMonitor`](monitor::DataMonitor), the fit/validate core
//! - **`schema`**: the learned bounds and value sets, persistable as JSON
//! - **`table`**: feature tables and Arrow `RecordBatch` conversion
//! - **`kinds`** / **`inference`**: how columns become numeric or categorical
//! - **`observer`**: where findings go once computed (`tracing` by default)
//! - **`pipeline`**: train/predict hooks and a thread-shared monitor
//! - **`sources`**: CSV, Parquet and JSON loading through DataFusion
//! - **`formatters`**: human, JSON and Markdown drift reports
//! - **`logging`**: log configuration and subscriber setup

pub mod error;
pub mod finding;
pub mod formatters;
pub mod inference;
pub mod kinds;
pub mod logging;
pub mod monitor;
pub mod observer;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod schema;
pub mod sources;
pub mod table;
