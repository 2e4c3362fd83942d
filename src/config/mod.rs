//! Pipeline configuration loaded from JSON.
//!
//! Defaults are deliberately neutral (identity clips, no smoothing): the
//! original workflow's aggressive percentile bounds are experiment tuning,
//! so they belong in the caller's config file, not in the library.

use crate::detect::{DetectorOptions, SpotDetector};
use crate::error::Error;
use crate::filter::{
    Bandpass, BandpassConfig, ClipConfig, ClipPercentile, FilterPipeline, GaussianConfig,
    GaussianLowPass,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Full pipeline configuration: the four standard filter stages in their
/// fixed order, the detector, the decode threshold and the worker count.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pre-filter clip, usually plane-wise.
    pub clip_pre: ClipConfig,
    pub bandpass: BandpassConfig,
    pub low_pass: GaussianConfig,
    /// Post-filter clip, usually volume-wide.
    pub clip_post: ClipConfig,
    pub detector: DetectorOptions,
    /// Strict lower bound on `total_intensity` for decoded rows.
    pub intensity_threshold: f32,
    /// Worker pool size; 0 lets rayon pick.
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clip_pre: ClipConfig::default(),
            bandpass: BandpassConfig::default(),
            low_pass: GaussianConfig::default(),
            clip_post: ClipConfig::default(),
            detector: DetectorOptions::default(),
            intensity_threshold: 0.0,
            workers: 0,
        }
    }
}

impl PipelineConfig {
    /// Validate every stage and assemble the filter pipeline and detector in
    /// the fixed clip → bandpass → low-pass → clip order.
    pub fn build_stages(&self) -> Result<(FilterPipeline, SpotDetector), Error> {
        let filters = FilterPipeline::new()
            .with_stage(Box::new(ClipPercentile::new(self.clip_pre)?))
            .with_stage(Box::new(Bandpass::new(self.bandpass)?))
            .with_stage(Box::new(GaussianLowPass::new(self.low_pass)?))
            .with_stage(Box::new(ClipPercentile::new(self.clip_post)?));
        let detector = SpotDetector::new(self.detector)?;
        Ok((filters, detector))
    }
}

/// Read a [`PipelineConfig`] from a JSON file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, Error> {
    let data = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}
