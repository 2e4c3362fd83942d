//! Percentile clip stage.

use super::pipeline::FilterStage;
use crate::error::{Error, StageError};
use crate::volume::VolumeF32;
use serde::Deserialize;

/// Percentile bounds for [`ClipPercentile`].
///
/// With `is_volume = false` the bounds are computed independently per
/// z-plane, otherwise once over the whole volume. `rescale` divides the
/// clipped values by the high bound so the output peaks at 1.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Lower percentile in [0, 100].
    pub p_min: f32,
    /// Upper percentile in [0, 100], at least `p_min`.
    pub p_max: f32,
    pub is_volume: bool,
    pub rescale: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            p_min: 0.0,
            p_max: 100.0,
            is_volume: false,
            rescale: false,
        }
    }
}

/// Clips voxel values to the percentile bounds of their scope.
///
/// A degenerate scope (all values equal, e.g. an all-zero plane) is left
/// unchanged so the stage never divides by zero.
pub struct ClipPercentile {
    cfg: ClipConfig,
}

impl ClipPercentile {
    pub fn new(cfg: ClipConfig) -> Result<Self, Error> {
        let in_range = |p: f32| (0.0..=100.0).contains(&p);
        if !in_range(cfg.p_min) || !in_range(cfg.p_max) {
            return Err(Error::Config(format!(
                "clip percentiles must lie in [0, 100], got ({}, {})",
                cfg.p_min, cfg.p_max
            )));
        }
        if cfg.p_min > cfg.p_max {
            return Err(Error::Config(format!(
                "clip requires p_min <= p_max, got ({}, {})",
                cfg.p_min, cfg.p_max
            )));
        }
        Ok(Self { cfg })
    }

    fn clip_scope(&self, scope: &mut [f32]) -> Result<(), StageError> {
        if scope.is_empty() {
            return Err(StageError("cannot take percentiles of an empty volume".into()));
        }
        let mut sorted = scope.to_vec();
        sorted.sort_by(f32::total_cmp);
        let low = percentile_sorted(&sorted, self.cfg.p_min);
        let high = percentile_sorted(&sorted, self.cfg.p_max);
        if high <= low {
            // degenerate scope, leave untouched
            return Ok(());
        }
        for v in scope.iter_mut() {
            *v = v.clamp(low, high);
        }
        if self.cfg.rescale {
            for v in scope.iter_mut() {
                *v /= high;
            }
        }
        Ok(())
    }
}

impl FilterStage for ClipPercentile {
    fn name(&self) -> &'static str {
        "clip"
    }

    fn run(&self, volume: &mut VolumeF32) -> Result<(), StageError> {
        if self.cfg.is_volume {
            self.clip_scope(volume.as_mut_slice())
        } else {
            for plane in volume.planes_mut() {
                self.clip_scope(plane)?;
            }
            Ok(())
        }
    }
}

/// Percentile of an ascending-sorted slice using the nearest lower rank.
///
/// Lower-rank selection (rather than interpolation) makes clipping
/// idempotent: clamping is monotone and keeps the values at the bound ranks
/// in place, so a second pass sees the same bounds.
pub(crate) fn percentile_sorted(sorted: &[f32], p: f32) -> f32 {
    debug_assert!(!sorted.is_empty());
    let rank = (p / 100.0 * (sorted.len() - 1) as f32).floor() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_volume() -> VolumeF32 {
        let data: Vec<f32> = (0..32).map(|i| i as f32).collect();
        VolumeF32::from_vec(2, 4, 4, data)
    }

    #[test]
    fn percentile_selects_lower_rank() {
        let sorted = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(percentile_sorted(&sorted, 0.0), 0.0);
        assert_eq!(percentile_sorted(&sorted, 100.0), 3.0);
        assert_eq!(percentile_sorted(&sorted, 50.0), 1.0);
        assert_eq!(percentile_sorted(&sorted, 75.0), 2.0);
    }

    #[test]
    fn full_range_clip_is_identity() {
        let cfg = ClipConfig {
            p_min: 0.0,
            p_max: 100.0,
            is_volume: true,
            rescale: false,
        };
        let stage = ClipPercentile::new(cfg).unwrap();
        let mut v = ramp_volume();
        let before = v.data.clone();
        stage.run(&mut v).unwrap();
        assert_eq!(v.data, before);
    }

    #[test]
    fn clip_is_idempotent() {
        let cfg = ClipConfig {
            p_min: 25.0,
            p_max: 75.0,
            is_volume: true,
            rescale: false,
        };
        let stage = ClipPercentile::new(cfg).unwrap();
        let mut once = ramp_volume();
        stage.run(&mut once).unwrap();
        let mut twice = once.clone();
        stage.run(&mut twice).unwrap();
        assert_eq!(once.data, twice.data);
    }

    #[test]
    fn all_zero_volume_is_left_unchanged() {
        let cfg = ClipConfig {
            p_min: 50.0,
            p_max: 100.0,
            is_volume: false,
            rescale: true,
        };
        let stage = ClipPercentile::new(cfg).unwrap();
        let mut v = VolumeF32::new(3, 4, 4);
        stage.run(&mut v).unwrap();
        assert!(v.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn plane_wise_bounds_differ_per_plane() {
        let mut data = vec![0.0f32; 8];
        data.extend((0..8).map(|i| i as f32 * 10.0));
        let mut v = VolumeF32::from_vec(2, 2, 4, data);
        let stage = ClipPercentile::new(ClipConfig {
            p_min: 0.0,
            p_max: 50.0,
            is_volume: false,
            rescale: false,
        })
        .unwrap();
        stage.run(&mut v).unwrap();
        // plane 0 is degenerate and untouched, plane 1 clamps to its median
        assert!(v.plane(0).iter().all(|&x| x == 0.0));
        assert!(v.plane(1).iter().all(|&x| x <= 35.0 + 1e-5));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = ClipPercentile::new(ClipConfig {
            p_min: 90.0,
            p_max: 10.0,
            ..Default::default()
        });
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
