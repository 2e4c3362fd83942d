//! Owned single-channel f32 volume in z-major row-major layout.
//!
//! Suited for numeric processing in the pipeline. Provides per-plane access
//! and a contiguous slice over the whole stack. Axis order is (z, y, x) with
//! z typically much smaller than y and x.

/// Dense 3D intensity buffer with `nz * ny * nx` contiguous voxels.
#[derive(Clone, Debug)]
pub struct VolumeF32 {
    /// Number of z-planes
    pub nz: usize,
    /// Plane height in voxels
    pub ny: usize,
    /// Plane width in voxels
    pub nx: usize,
    /// Backing storage, z-major then row-major
    pub data: Vec<f32>,
}

impl VolumeF32 {
    /// Construct a zero-initialized volume of size `nz × ny × nx`.
    pub fn new(nz: usize, ny: usize, nx: usize) -> Self {
        Self {
            nz,
            ny,
            nx,
            data: vec![0.0; nz * ny * nx],
        }
    }

    /// Wrap an existing buffer. The length must match the dimensions.
    pub fn from_vec(nz: usize, ny: usize, nx: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), nz * ny * nx, "buffer length must match dimensions");
        Self { nz, ny, nx, data }
    }

    /// Dimensions as a `(nz, ny, nx)` tuple.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nz, self.ny, self.nx)
    }

    /// Number of voxels in one z-plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.ny * self.nx
    }

    #[inline]
    /// Convert (z, y, x) to a linear index into `data`.
    pub fn idx(&self, z: usize, y: usize, x: usize) -> usize {
        (z * self.ny + y) * self.nx + x
    }

    #[inline]
    /// Get the voxel value at (z, y, x).
    pub fn get(&self, z: usize, y: usize, x: usize) -> f32 {
        self.data[self.idx(z, y, x)]
    }

    #[inline]
    /// Set the voxel value at (z, y, x).
    pub fn set(&mut self, z: usize, y: usize, x: usize, v: f32) {
        let i = self.idx(z, y, x);
        self.data[i] = v;
    }

    #[inline]
    /// Borrow one z-plane as a row-major slice.
    pub fn plane(&self, z: usize) -> &[f32] {
        let len = self.plane_len();
        let start = z * len;
        &self.data[start..start + len]
    }

    #[inline]
    /// Mutably borrow one z-plane.
    pub fn plane_mut(&mut self, z: usize) -> &mut [f32] {
        let len = self.plane_len();
        let start = z * len;
        &mut self.data[start..start + len]
    }

    /// Iterate over all z-planes as disjoint mutable slices.
    pub fn planes_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        let len = self.plane_len();
        self.data.chunks_exact_mut(len.max(1))
    }

    #[inline]
    /// Contiguous view over the whole stack.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    /// Mutable contiguous view over the whole stack.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_is_z_major() {
        let mut v = VolumeF32::new(2, 3, 4);
        v.set(1, 2, 3, 7.0);
        assert_eq!(v.data[1 * 12 + 2 * 4 + 3], 7.0);
        assert_eq!(v.get(1, 2, 3), 7.0);
    }

    #[test]
    fn planes_are_disjoint_views() {
        let mut v = VolumeF32::new(3, 2, 2);
        for (z, plane) in v.planes_mut().enumerate() {
            plane.fill(z as f32);
        }
        assert_eq!(v.plane(0), &[0.0; 4]);
        assert_eq!(v.plane(2), &[2.0; 4]);
    }
}
