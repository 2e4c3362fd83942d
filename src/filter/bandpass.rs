//! Bandpass stage: per-plane noise and background suppression.

use super::kernels::{boxcar_taps, convolve_cols, convolve_rows, gaussian_taps};
use super::pipeline::FilterStage;
use crate::error::{Error, StageError};
use crate::volume::VolumeF32;
use serde::Deserialize;

/// Length scales and floor for [`Bandpass`].
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct BandpassConfig {
    /// Gaussian scale of the features to keep (voxels), `0 < lshort < llong`.
    pub lshort: f32,
    /// Boxcar half-width of the background to subtract (voxels).
    pub llong: f32,
    /// Absolute floor: filtered values below this are zeroed.
    pub threshold: f32,
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            lshort: 0.5,
            llong: 7.0,
            threshold: 1e-4,
        }
    }
}

/// Suppresses high-frequency noise and low-frequency background per z-plane.
///
/// Each plane is smoothed with a separable Gaussian at scale `lshort` and a
/// separable boxcar background estimate at half-width `llong` is subtracted;
/// the result is floored at zero and values below `threshold` are dropped.
/// Planes never couple, so they are independent units of parallel work.
pub struct Bandpass {
    cfg: BandpassConfig,
    gauss: Vec<f32>,
    boxcar: Vec<f32>,
}

impl Bandpass {
    pub fn new(cfg: BandpassConfig) -> Result<Self, Error> {
        if !(cfg.lshort > 0.0 && cfg.llong > 0.0 && cfg.lshort < cfg.llong) {
            return Err(Error::Config(format!(
                "bandpass requires 0 < lshort < llong, got ({}, {})",
                cfg.lshort, cfg.llong
            )));
        }
        if !(cfg.threshold >= 0.0 && cfg.threshold.is_finite()) {
            return Err(Error::Config(format!(
                "bandpass threshold must be finite and non-negative, got {}",
                cfg.threshold
            )));
        }
        Ok(Self {
            gauss: gaussian_taps(cfg.lshort),
            boxcar: boxcar_taps(cfg.llong.ceil() as usize),
            cfg,
        })
    }

    fn filter_plane(&self, plane: &mut [f32], w: usize, h: usize) {
        let mut scratch = vec![0.0f32; plane.len()];
        let mut background = vec![0.0f32; plane.len()];

        convolve_rows(plane, &mut scratch, w, h, &self.boxcar);
        convolve_cols(&scratch, &mut background, w, h, &self.boxcar);

        let mut signal = vec![0.0f32; plane.len()];
        convolve_rows(plane, &mut scratch, w, h, &self.gauss);
        convolve_cols(&scratch, &mut signal, w, h, &self.gauss);

        for ((out, sig), bg) in plane.iter_mut().zip(&signal).zip(&background) {
            let v = sig - bg;
            *out = if v < self.cfg.threshold { 0.0 } else { v };
        }
    }
}

impl FilterStage for Bandpass {
    fn name(&self) -> &'static str {
        "bandpass"
    }

    fn run(&self, volume: &mut VolumeF32) -> Result<(), StageError> {
        let (_, ny, nx) = volume.shape();
        if ny < 1 || nx < 1 {
            return Err(StageError("bandpass needs non-empty planes".into()));
        }
        run_planes(self, volume, ny, nx);
        Ok(())
    }
}

#[cfg(feature = "parallel")]
fn run_planes(stage: &Bandpass, volume: &mut VolumeF32, ny: usize, nx: usize) {
    use rayon::prelude::*;

    let planes: Vec<&mut [f32]> = volume.planes_mut().collect();
    planes
        .into_par_iter()
        .for_each(|plane| stage.filter_plane(plane, nx, ny));
}

#[cfg(not(feature = "parallel"))]
fn run_planes(stage: &Bandpass, volume: &mut VolumeF32, ny: usize, nx: usize) {
    for plane in volume.planes_mut() {
        stage.filter_plane(plane, nx, ny);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_non_negative_and_thresholded() {
        let mut v = VolumeF32::new(2, 16, 16);
        v.set(0, 8, 8, 1.0);
        v.set(1, 4, 4, 0.5);
        let stage = Bandpass::new(BandpassConfig::default()).unwrap();
        stage.run(&mut v).unwrap();
        assert!(v.as_slice().iter().all(|&x| x >= 0.0));
        assert!(v
            .as_slice()
            .iter()
            .all(|&x| x == 0.0 || x >= 1e-4));
    }

    #[test]
    fn flat_background_is_removed() {
        let mut v = VolumeF32::from_vec(1, 16, 16, vec![0.3; 256]);
        let stage = Bandpass::new(BandpassConfig::default()).unwrap();
        stage.run(&mut v).unwrap();
        assert!(v.as_slice().iter().all(|&x| x == 0.0), "flat plane should vanish");
    }

    #[test]
    fn isolated_peak_survives() {
        let mut v = VolumeF32::new(1, 32, 32);
        v.set(0, 16, 16, 10.0);
        let stage = Bandpass::new(BandpassConfig::default()).unwrap();
        stage.run(&mut v).unwrap();
        assert!(v.get(0, 16, 16) > 0.0, "peak should survive the bandpass");
    }

    #[test]
    fn rejects_inverted_scales() {
        let err = Bandpass::new(BandpassConfig {
            lshort: 7.0,
            llong: 0.5,
            threshold: 0.0,
        });
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
