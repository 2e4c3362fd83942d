//! Parameter types configuring the spot detector.

use crate::error::Error;
use serde::Deserialize;

/// Detection knobs. Validated once by [`SpotDetector::new`](super::SpotDetector::new).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Odd box edge length (voxels) used for the local-maximum test and for
    /// mass/centroid integration.
    pub spot_diameter: usize,
    /// Keep only spots with integrated mass strictly above this value.
    pub min_mass: f32,
    /// Keep only spots whose RMS radius does not exceed this value (voxels).
    pub max_size: f32,
    /// Minimum Euclidean distance between retained maxima (voxels). On
    /// conflict the higher-mass spot wins; ties go to the lexicographically
    /// smallest (z, y, x).
    pub separation: f32,
    /// Detect across neighboring z-planes (3D) instead of per plane.
    pub is_volume: bool,
    /// Candidate intensity floor expressed as a percentile of all voxel
    /// values. Keeps constant plateaus (e.g. after an aggressive clip) from
    /// flooding the candidate list.
    pub percentile: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            spot_diameter: 3,
            min_mass: 0.0,
            max_size: f32::INFINITY,
            separation: 5.0,
            is_volume: true,
            percentile: 64.0,
        }
    }
}

impl DetectorOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if self.spot_diameter < 1 || self.spot_diameter % 2 == 0 {
            return Err(Error::Config(format!(
                "spot_diameter must be an odd integer >= 1, got {}",
                self.spot_diameter
            )));
        }
        if !(self.min_mass >= 0.0 && self.min_mass.is_finite()) {
            return Err(Error::Config(format!(
                "min_mass must be finite and non-negative, got {}",
                self.min_mass
            )));
        }
        if !(self.max_size > 0.0) {
            return Err(Error::Config(format!(
                "max_size must be positive, got {}",
                self.max_size
            )));
        }
        if !(self.separation > 0.0 && self.separation.is_finite()) {
            return Err(Error::Config(format!(
                "separation must be finite and positive, got {}",
                self.separation
            )));
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(Error::Config(format!(
                "percentile must lie in [0, 100], got {}",
                self.percentile
            )));
        }
        Ok(())
    }
}
