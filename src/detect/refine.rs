//! Candidate characterization and separation suppression.

use super::peaks::Candidate;
use crate::intensity::SpotRecord;
use crate::volume::VolumeF32;

/// Integrate the candidate's box: total mass, intensity-weighted sub-voxel
/// centroid and RMS radius around that centroid.
pub(crate) fn characterize(
    volume: &VolumeF32,
    c: &Candidate,
    r_xy: usize,
    r_z: usize,
) -> SpotRecord {
    let (nz, ny, nx) = volume.shape();
    let z0 = c.z.saturating_sub(r_z);
    let z1 = (c.z + r_z).min(nz.saturating_sub(1));
    let y0 = c.y.saturating_sub(r_xy);
    let y1 = (c.y + r_xy).min(ny.saturating_sub(1));
    let x0 = c.x.saturating_sub(r_xy);
    let x1 = (c.x + r_xy).min(nx.saturating_sub(1));

    let mut mass = 0.0f64;
    let mut mz = 0.0f64;
    let mut my = 0.0f64;
    let mut mx = 0.0f64;
    for z in z0..=z1 {
        let plane = volume.plane(z);
        for y in y0..=y1 {
            let row = &plane[y * nx..y * nx + nx];
            for (x, &v) in row.iter().enumerate().take(x1 + 1).skip(x0) {
                let v = v as f64;
                mass += v;
                mz += v * z as f64;
                my += v * y as f64;
                mx += v * x as f64;
            }
        }
    }

    if mass <= 0.0 {
        return SpotRecord {
            z: c.z as f32,
            y: c.y as f32,
            x: c.x as f32,
            mass: 0.0,
            size: 0.0,
            source_image: 0,
        };
    }

    let cz = mz / mass;
    let cy = my / mass;
    let cx = mx / mass;

    let mut spread = 0.0f64;
    for z in z0..=z1 {
        let plane = volume.plane(z);
        for y in y0..=y1 {
            let row = &plane[y * nx..y * nx + nx];
            for (x, &v) in row.iter().enumerate().take(x1 + 1).skip(x0) {
                let dz = z as f64 - cz;
                let dy = y as f64 - cy;
                let dx = x as f64 - cx;
                spread += v as f64 * (dz * dz + dy * dy + dx * dx);
            }
        }
    }

    SpotRecord {
        z: cz as f32,
        y: cy as f32,
        x: cx as f32,
        mass: mass as f32,
        size: (spread / mass).sqrt() as f32,
        source_image: 0,
    }
}

/// Greedily retain spots no closer than `separation` to a stronger kept one.
///
/// Ordering is mass descending, ties broken by the lexicographically smallest
/// (z, y, x), which makes the winner on a conflict deterministic.
pub(crate) fn enforce_separation(mut spots: Vec<SpotRecord>, separation: f32) -> Vec<SpotRecord> {
    if spots.len() < 2 {
        return spots;
    }
    spots.sort_by(|a, b| {
        b.mass
            .total_cmp(&a.mass)
            .then(a.z.total_cmp(&b.z))
            .then(a.y.total_cmp(&b.y))
            .then(a.x.total_cmp(&b.x))
    });

    let sep2 = separation * separation;
    let mut kept: Vec<SpotRecord> = Vec::with_capacity(spots.len());
    for s in spots {
        let clear = kept.iter().all(|k| {
            let dz = k.z - s.z;
            let dy = k.y - s.y;
            let dx = k.x - s.x;
            dz * dz + dy * dy + dx * dx >= sep2
        });
        if clear {
            kept.push(s);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(z: f32, y: f32, x: f32, mass: f32) -> SpotRecord {
        SpotRecord {
            z,
            y,
            x,
            mass,
            size: 1.0,
            source_image: 0,
        }
    }

    #[test]
    fn higher_mass_wins_a_conflict() {
        let kept = enforce_separation(
            vec![spot(0.0, 10.0, 10.0, 5.0), spot(0.0, 10.0, 12.0, 9.0)],
            5.0,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].x, 12.0);
    }

    #[test]
    fn equal_mass_conflict_keeps_smallest_coordinate() {
        let kept = enforce_separation(
            vec![spot(0.0, 10.0, 12.0, 5.0), spot(0.0, 10.0, 10.0, 5.0)],
            5.0,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].x, 10.0);
    }

    #[test]
    fn distant_spots_all_survive() {
        let kept = enforce_separation(
            vec![spot(0.0, 0.0, 0.0, 1.0), spot(0.0, 0.0, 8.0, 2.0)],
            5.0,
        );
        assert_eq!(kept.len(), 2);
    }
}
