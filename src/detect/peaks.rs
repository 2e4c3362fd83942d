//! Local-maximum scan over a volume.
//!
//! A voxel qualifies when no strictly greater value exists inside its
//! Chebyshev box (clamped at the borders). Equal-valued plateau voxels all
//! qualify here; the separation suppression downstream collapses them with
//! a deterministic tie-break.

use crate::volume::VolumeF32;

/// One raw candidate before refinement.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    pub z: usize,
    pub y: usize,
    pub x: usize,
}

/// Scan for candidates with value strictly above `floor`.
pub(crate) fn find_local_maxima(
    volume: &VolumeF32,
    r_xy: usize,
    r_z: usize,
    floor: f32,
) -> Vec<Candidate> {
    let (nz, ny, nx) = volume.shape();
    let mut out = Vec::new();

    for z in 0..nz {
        let z0 = z.saturating_sub(r_z);
        let z1 = (z + r_z).min(nz.saturating_sub(1));
        for y in 0..ny {
            let y0 = y.saturating_sub(r_xy);
            let y1 = (y + r_xy).min(ny.saturating_sub(1));
            let row = &volume.plane(z)[y * nx..y * nx + nx];
            'scan: for x in 0..nx {
                let v0 = row[x];
                if v0 <= floor {
                    continue;
                }
                let x0 = x.saturating_sub(r_xy);
                let x1 = (x + r_xy).min(nx - 1);
                for zz in z0..=z1 {
                    let plane = volume.plane(zz);
                    for yy in y0..=y1 {
                        let nrow = &plane[yy * nx..yy * nx + nx];
                        for &v in &nrow[x0..=x1] {
                            if v > v0 {
                                continue 'scan;
                            }
                        }
                    }
                }
                out.push(Candidate { z, y, x });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_maximum_in_3d() {
        let mut v = VolumeF32::new(5, 9, 9);
        v.set(2, 4, 4, 1.0);
        v.set(2, 4, 5, 0.5);
        let found = find_local_maxima(&v, 1, 1, 0.0);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].z, found[0].y, found[0].x), (2, 4, 4));
    }

    #[test]
    fn plane_mode_ignores_brighter_neighbor_plane() {
        let mut v = VolumeF32::new(3, 5, 5);
        v.set(0, 2, 2, 0.4);
        v.set(1, 2, 2, 1.0);
        let flat = find_local_maxima(&v, 1, 0, 0.0);
        assert_eq!(flat.len(), 2, "per-plane scan keeps both maxima");
        let volumetric = find_local_maxima(&v, 1, 1, 0.0);
        assert_eq!(volumetric.len(), 1, "3D scan suppresses the dimmer plane");
    }

    #[test]
    fn floor_excludes_plateau_background() {
        let mut v = VolumeF32::from_vec(1, 4, 4, vec![0.2; 16]);
        v.set(0, 1, 1, 0.9);
        let found = find_local_maxima(&v, 1, 0, 0.2);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].y, found[0].x), (1, 1));
    }
}
