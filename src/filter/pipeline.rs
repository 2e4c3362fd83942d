//! Ordered composition of filter stages.

use crate::error::StageError;
use crate::volume::VolumeF32;

/// One in-place transformation of a volume. Implementations carry their own
/// validated configuration and hold no mutable state, so a stage can serve
/// many volumes concurrently.
pub trait FilterStage: Send + Sync {
    /// Short stable stage name used in events and failure reports.
    fn name(&self) -> &'static str;

    /// Apply the stage to `volume` in place.
    fn run(&self, volume: &mut VolumeF32) -> Result<(), StageError>;
}

/// Ordered list of boxed stages, each consuming the previous stage's output.
///
/// Stages mutate the volume in place, so a run never holds more than the
/// volume itself plus one scratch buffer. The first failing stage aborts the
/// pipeline for that volume; the error names the stage.
#[derive(Default)]
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage, builder style.
    pub fn with_stage(mut self, stage: Box<dyn FilterStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: Box<dyn FilterStage>) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Box<dyn FilterStage>] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply all stages in order. On failure returns the stage name together
    /// with its error.
    pub fn run(&self, volume: &mut VolumeF32) -> Result<(), (&'static str, StageError)> {
        for stage in &self.stages {
            stage.run(volume).map_err(|e| (stage.name(), e))?;
        }
        Ok(())
    }
}
