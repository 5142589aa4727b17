//! Processor factory - the entry point a host uses to obtain processors

use crate::domain::ZoneFilter;
use crate::error::{ProcessError, Result};
use crate::infra::config::excluded_zones;
use crate::infra::metrics::Metrics;
use crate::services::processor::{PickingStreamProcessor, StreamProcessor};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub trait EventProcessorFactory: Send + Sync {
    /// Create a processor bounded by `max_events` lines and `max_time`.
    ///
    /// A missing `max_time` is rejected with `InvalidArgument`.
    fn create_processor(
        &self,
        max_events: usize,
        max_time: Option<Duration>,
    ) -> Result<Box<dyn StreamProcessor>>;
}

/// Factory for [`PickingStreamProcessor`]s sharing one set of metrics
pub struct PickingProcessorFactory {
    /// Explicit policy; `None` means the process-wide one
    zone_filter: Option<ZoneFilter>,
    metrics: Arc<Metrics>,
}

impl Default for PickingProcessorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PickingProcessorFactory {
    pub fn new() -> Self {
        Self { zone_filter: None, metrics: Arc::new(Metrics::new()) }
    }

    pub fn with_zone_filter(mut self, zone_filter: ZoneFilter) -> Self {
        self.zone_filter = Some(zone_filter);
        self
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Concrete-typed variant of [`EventProcessorFactory::create_processor`]
    pub fn create(&self, max_events: usize, max_time: Option<Duration>) -> Result<PickingStreamProcessor> {
        let max_time = max_time.ok_or_else(|| ProcessError::invalid_argument("max_time must be set"))?;
        let zone_filter = match &self.zone_filter {
            Some(zone_filter) => zone_filter.clone(),
            None => excluded_zones().clone(),
        };

        debug!(
            max_events = %max_events,
            max_time_ms = %max_time.as_millis(),
            excluded = ?zone_filter.excluded(),
            "processor_created"
        );

        Ok(PickingStreamProcessor::with_policy(max_events, max_time, zone_filter)
            .with_metrics(self.metrics.clone()))
    }
}

impl EventProcessorFactory for PickingProcessorFactory {
    fn create_processor(
        &self,
        max_events: usize,
        max_time: Option<Duration>,
    ) -> Result<Box<dyn StreamProcessor>> {
        Ok(Box::new(self.create(max_events, max_time)?))
    }
}
