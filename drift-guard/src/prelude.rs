//! Prelude for commonly used types and traits in drift-guard.

pub use crate::error::{DriftError, Result};
pub use crate::finding::{Finding, FindingKind};
pub use crate::kinds::{FeatureKind, FeatureKinds};
pub use crate::logging::LogConfig;
pub use crate::monitor::{DataMonitor, MonitorConfig, MonitorState, UnseenFeaturePolicy};
pub use crate::observer::FindingObserver;
pub use crate::report::DriftReport;
pub use crate::schema::DataSchema;
pub use crate::table::{FeatureTable, Value};
