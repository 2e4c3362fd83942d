//! Local-maximum spot detection on filtered volumes.
//!
//! The detector scans for voxels with no strictly greater neighbor inside a
//! Chebyshev box sized by `spot_diameter`, characterizes each candidate
//! (integrated mass, intensity-weighted sub-voxel centroid, RMS radius),
//! gates on mass and size, and finally suppresses candidates closer than
//! `separation` to a stronger one. An empty result is valid output, not an
//! error.

mod options;
mod peaks;
mod refine;

pub use options::DetectorOptions;

use crate::error::Error;
use crate::intensity::SpotRecord;
use crate::volume::VolumeF32;

/// Spot detector with validated options.
pub struct SpotDetector {
    opts: DetectorOptions,
}

impl SpotDetector {
    /// Create a detector, rejecting invalid parameters up front.
    pub fn new(opts: DetectorOptions) -> Result<Self, Error> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.opts
    }

    /// Find spots in a filtered volume.
    ///
    /// Emitted records carry `source_image = 0`; the aggregator stamps the
    /// real source index during concatenation.
    pub fn detect(&self, volume: &VolumeF32) -> Vec<SpotRecord> {
        let r_xy = self.opts.spot_diameter / 2;
        let r_z = if self.opts.is_volume { r_xy } else { 0 };

        let floor = candidate_floor(volume, self.opts.percentile);
        let candidates = peaks::find_local_maxima(volume, r_xy, r_z, floor);

        let mut spots: Vec<SpotRecord> = candidates
            .iter()
            .map(|c| refine::characterize(volume, c, r_xy, r_z))
            .filter(|s| s.mass > self.opts.min_mass && s.size <= self.opts.max_size)
            .collect();

        spots = refine::enforce_separation(spots, self.opts.separation);
        // deterministic scan order for downstream consumers
        spots.sort_by(|a, b| {
            a.z.total_cmp(&b.z)
                .then(a.y.total_cmp(&b.y))
                .then(a.x.total_cmp(&b.x))
        });
        spots
    }
}

/// Intensity floor below which voxels are never candidates: the configured
/// percentile of all voxel values, but at least zero so background that a
/// clip stage lifted to a constant plateau stays excluded.
fn candidate_floor(volume: &VolumeF32, percentile: f32) -> f32 {
    if volume.as_slice().is_empty() {
        return 0.0;
    }
    let mut sorted = volume.as_slice().to_vec();
    sorted.sort_by(f32::total_cmp);
    crate::filter::percentile_sorted(&sorted, percentile).max(0.0)
}
