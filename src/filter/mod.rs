//! Filter stages and their ordered composition.
//!
//! Each stage mutates a [`VolumeF32`](crate::volume::VolumeF32) in place
//! through the [`FilterStage`] trait; the [`FilterPipeline`] applies an
//! ordered list of boxed stages. Stage parameters are validated at
//! construction, never during a run.

mod bandpass;
mod clip;
mod gaussian;
pub(crate) mod kernels;
mod pipeline;

pub use bandpass::{Bandpass, BandpassConfig};
pub(crate) use clip::percentile_sorted;
pub use clip::{ClipConfig, ClipPercentile};
pub use gaussian::{GaussianConfig, GaussianLowPass};
pub use pipeline::{FilterPipeline, FilterStage};
