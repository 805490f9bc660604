//! Adapters for embedding a monitor in a training/serving pipeline.
//!
//! A pipeline has two moments a monitor cares about: training, when the
//! reference data is known, and prediction, when runtime data arrives.
//! [`PipelineHook`] is that two-method contract; [`MonitorStage`] implements
//! it for a [`DataMonitor`], and [`SharedMonitor`] makes one monitor usable
//! from many request handlers at once.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;
use crate::finding::Finding;
use crate::kinds::FeatureKinds;
use crate::monitor::{DataMonitor, MonitorState};
use crate::report::DriftReport;
use crate::schema::DataSchema;
use crate::table::FeatureTable;

/// The train-time and predict-time hooks of a pipeline.
pub trait PipelineHook {
    /// Called with the training features.
    fn on_train(&mut self, features: &FeatureTable) -> Result<()>;

    /// Called with the features of each prediction batch.
    fn on_predict(&self, features: &FeatureTable) -> Result<Vec<Finding>>;
}

/// A pass-through pipeline stage that monitors the data flowing through it.
///
/// # Examples
///
/// ```rust
/// use drift_guard::prelude::*;
/// use drift_guard::pipeline::{MonitorStage, PipelineHook};
///
/// let mut stage = MonitorStage::new(DataMonitor::new(), FeatureKinds::infer());
///
/// let train = FeatureTable::builder().column("x", [1.0, 2.0]).build().unwrap();
/// stage.on_train(&train).unwrap();
///
/// let batch = FeatureTable::builder().column("x", [1.5]).build().unwrap();
/// let passed = stage.transform(&batch).unwrap();
/// assert_eq!(passed, &batch);
/// ```
#[derive(Debug)]
pub struct MonitorStage {
    monitor: DataMonitor,
    kinds: FeatureKinds,
}

impl MonitorStage {
    /// Wraps a monitor; `kinds` is used every time the stage is trained.
    pub fn new(monitor: DataMonitor, kinds: FeatureKinds) -> Self {
        Self { monitor, kinds }
    }

    /// Returns the wrapped monitor.
    pub fn monitor(&self) -> &DataMonitor {
        &self.monitor
    }

    /// Unwraps the stage.
    pub fn into_inner(self) -> DataMonitor {
        self.monitor
    }

    /// Validates a batch and hands it back unchanged.
    pub fn transform<'a>(&self, features: &'a FeatureTable) -> Result<&'a FeatureTable> {
        self.on_predict(features)?;
        Ok(features)
    }
}

impl PipelineHook for MonitorStage {
    fn on_train(&mut self, features: &FeatureTable) -> Result<()> {
        self.monitor.fit(features, &self.kinds)
    }

    fn on_predict(&self, features: &FeatureTable) -> Result<Vec<Finding>> {
        self.monitor.validate(features)
    }
}

/// A monitor shared between threads.
///
/// Validations take a read lock and run concurrently; `fit` takes the write
/// lock, so a re-fit never interleaves with a validation of the same monitor.
#[derive(Debug, Clone)]
pub struct SharedMonitor {
    inner: Arc<RwLock<DataMonitor>>,
}

impl SharedMonitor {
    /// Shares a monitor.
    pub fn new(monitor: DataMonitor) -> Self {
        Self {
            inner: Arc::new(RwLock::new(monitor)),
        }
    }

    /// Re-fits the shared monitor.
    pub fn fit(&self, reference: &FeatureTable, kinds: &FeatureKinds) -> Result<()> {
        // A panicking observer cannot leave the schema half-replaced, so a
        // poisoned lock still guards a consistent monitor.
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fit(reference, kinds)
    }

    /// Validates against the current schema.
    pub fn validate(&self, runtime: &FeatureTable) -> Result<Vec<Finding>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .validate(runtime)
    }

    /// Validates against the current schema and returns a full report.
    pub fn validate_report(&self, runtime: &FeatureTable) -> Result<DriftReport> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .validate_report(runtime)
    }

    /// Returns a snapshot of the current schema.
    pub fn schema(&self) -> Option<DataSchema> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .schema()
            .cloned()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> MonitorState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }
}
