//! Stage-transition events and timing records emitted during a run.
//!
//! The core never prints or holds global logging state; it hands structured
//! [`StageEvent`]s to a caller-supplied [`ProgressSink`]. [`LogSink`] routes
//! them to the `log` facade, [`NullSink`] discards them. Events for one image
//! always arrive in the configured stage order; with the `parallel` feature
//! enabled, events from different images may interleave.

use serde::{Deserialize, Serialize};

/// Completion status carried by a stage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageStatus {
    Completed,
    Failed,
}

/// One stage transition: which stage, which image (if per-image), outcome and
/// wall-clock duration.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub stage: String,
    /// Source image index for per-image stages, `None` for the aggregate
    /// decode/threshold stages.
    pub image: Option<usize>,
    pub status: StageStatus,
    pub elapsed_ms: f64,
}

/// Receiver for stage events. Implementations must be shareable across the
/// worker pool.
pub trait ProgressSink: Send + Sync {
    fn stage_event(&self, event: &StageEvent);
}

/// Discards all events.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn stage_event(&self, _event: &StageEvent) {}
}

/// Routes events to the `log` facade: `debug` for completions, `warn` for
/// failures.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn stage_event(&self, event: &StageEvent) {
        match event.status {
            StageStatus::Completed => log::debug!(
                "stage={} image={:?} elapsed_ms={:.3}",
                event.stage,
                event.image,
                event.elapsed_ms
            ),
            StageStatus::Failed => log::warn!(
                "stage={} image={:?} failed after {:.3} ms",
                event.stage,
                event.image,
                event.elapsed_ms
            ),
        }
    }
}

/// Timing entry describing a single stage of the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one field-of-view run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }
}
