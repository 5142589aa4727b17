//! Stream processor - reads picking events and writes the per-picker report
//!
//! One `process` call walks through:
//! read (bounded by count and time) → decode + filter → group → sort →
//! encode → single write to the sink.
//!
//! Any decode or IO failure aborts the call before anything is written.
//! Running into the time limit is not a failure: the lines read so far are
//! processed as if the input had ended there.

use crate::domain::ZoneFilter;
use crate::error::{ProcessError, Result};
use crate::infra::config::excluded_zones;
use crate::infra::metrics::Metrics;
use crate::io::{encode_pickers, BoundedLineReader, StopReason};
use crate::services::pipeline::{aggregate, decode_and_filter};
use async_trait::async_trait;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

/// Processor handed out by an [`EventProcessorFactory`](crate::services::EventProcessorFactory)
#[async_trait]
pub trait StreamProcessor: Send + Sync {
    /// Process `source` and write the result to `sink`.
    ///
    /// Fails with `InvalidArgument` before touching either stream when one
    /// of them is absent.
    async fn process(
        &self,
        source: Option<Box<dyn Read + Send>>,
        sink: Option<&mut (dyn AsyncWrite + Send + Unpin)>,
    ) -> Result<ProcessSummary>;
}

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSummary {
    pub lines_read: usize,
    pub events_accepted: usize,
    pub events_excluded: usize,
    pub pickers: usize,
    pub picks: usize,
    pub bytes_written: usize,
    pub stop_reason: StopReason,
}

/// Bounded picking-event processor
pub struct PickingStreamProcessor {
    reader: BoundedLineReader,
    zone_filter: ZoneFilter,
    metrics: Arc<Metrics>,
}

impl PickingStreamProcessor {
    /// Create a processor using the process-wide excluded zone policy
    pub fn new(max_events: usize, max_time: Duration) -> Self {
        Self::with_policy(max_events, max_time, excluded_zones().clone())
    }

    /// Create a processor with an explicit excluded zone policy
    pub fn with_policy(max_events: usize, max_time: Duration, zone_filter: ZoneFilter) -> Self {
        Self {
            reader: BoundedLineReader::new(max_events, max_time),
            zone_filter,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn max_events(&self) -> usize {
        self.reader.max_lines()
    }

    pub fn max_time(&self) -> Duration {
        self.reader.max_time()
    }

    pub fn zone_filter(&self) -> &ZoneFilter {
        &self.zone_filter
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Generic form of [`StreamProcessor::process`]
    pub async fn process_stream<R, W>(
        &self,
        source: Option<R>,
        sink: Option<&mut W>,
    ) -> Result<ProcessSummary>
    where
        R: Read + Send + 'static,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (Some(source), Some(sink)) = (source, sink) else {
            return Err(ProcessError::invalid_argument("source and sink must both be present"));
        };

        let result = self.run(source, sink).await;
        if let Err(e) = &result {
            match e {
                ProcessError::Decode { .. } => self.metrics.record_decode_failure(),
                ProcessError::Io(_) => self.metrics.record_io_failure(),
                ProcessError::InvalidArgument(_) => {}
            }
            error!(kind = %e.kind(), error = %e, "stream_processing_failed");
        }
        result
    }

    async fn run<R, W>(&self, source: R, sink: &mut W) -> Result<ProcessSummary>
    where
        R: Read + Send + 'static,
        W: AsyncWrite + Unpin + ?Sized,
    {
        let started = Instant::now();

        let collected = self.reader.read(source).await?;
        let lines_read = collected.lines.len();
        self.metrics.record_lines_read(lines_read, collected.stop_reason);

        let filtered = decode_and_filter(&collected.lines, &self.zone_filter)?;
        let events_accepted = filtered.accepted.len();
        let events_excluded = filtered.excluded;

        let pickers = aggregate(filtered.accepted);
        let picks = pickers.iter().map(|picker| picker.picks.len()).sum();

        let body = encode_pickers(&pickers).map_err(io::Error::from)?;
        sink.write_all(&body).await?;
        sink.flush().await?;

        self.metrics.record_run_completed(events_accepted, events_excluded, pickers.len(), picks);

        let summary = ProcessSummary {
            lines_read,
            events_accepted,
            events_excluded,
            pickers: pickers.len(),
            picks,
            bytes_written: body.len(),
            stop_reason: collected.stop_reason,
        };

        info!(
            lines_read = %summary.lines_read,
            accepted = %summary.events_accepted,
            excluded = %summary.events_excluded,
            pickers = %summary.pickers,
            picks = %summary.picks,
            bytes = %summary.bytes_written,
            stop_reason = %summary.stop_reason.as_str(),
            elapsed_ms = %started.elapsed().as_millis(),
            "stream_processed"
        );

        Ok(summary)
    }
}

#[async_trait]
impl StreamProcessor for PickingStreamProcessor {
    async fn process(
        &self,
        source: Option<Box<dyn Read + Send>>,
        sink: Option<&mut (dyn AsyncWrite + Send + Unpin)>,
    ) -> Result<ProcessSummary> {
        self.process_stream(source, sink).await
    }
}
