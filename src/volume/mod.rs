//! In-memory volumetric buffers shared by every pipeline stage.
mod buffer;

pub use buffer::VolumeF32;
