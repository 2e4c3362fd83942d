#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod codebook;
pub mod config;
pub mod detect;
pub mod error;
pub mod events;
pub mod filter;
pub mod intensity;
pub mod pipeline;
pub mod volume;

// --- High-level re-exports -------------------------------------------------

// Main entry points: orchestrator + results.
pub use crate::codebook::{Codebook, DecodedTable};
pub use crate::error::{Error, ImageFailure};
pub use crate::pipeline::{FieldImage, ImageLoader, PipelineOrchestrator, RunReport};
pub use crate::volume::VolumeF32;

/// Small prelude for quick experiments.
///
/// ```no_run
/// use spot_decoder::prelude::*;
///
/// # fn main() -> Result<(), spot_decoder::Error> {
/// let codebook = Codebook::new(1, 1, vec![CodebookEntry::new("ACTB", &[(0, 0, 1.0)])])?;
/// let orchestrator = PipelineOrchestrator::from_config(&PipelineConfig::default(), codebook)?;
/// let images = vec![FieldImage { round: 0, channel: 0, volume: VolumeF32::new(5, 64, 64) }];
/// let report = orchestrator.run(images, &NullSink)?;
/// println!("decoded={} failed={}", report.table.len(), report.failures.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::codebook::{Codebook, CodebookEntry, DecodedTable};
    pub use crate::config::PipelineConfig;
    pub use crate::events::{LogSink, NullSink, ProgressSink};
    pub use crate::{FieldImage, PipelineOrchestrator, RunReport, VolumeF32};
}
