use spot_decoder::VolumeF32;

/// Adds a Gaussian point source of the given amplitude and sigma, truncated
/// at four sigma and clamped to the volume bounds.
pub fn seed_spot(volume: &mut VolumeF32, z: usize, y: usize, x: usize, amplitude: f32, sigma: f32) {
    assert!(sigma > 0.0, "sigma must be positive");
    let (nz, ny, nx) = volume.shape();
    let r = (4.0 * sigma).ceil() as i64;
    for dz in -r..=r {
        for dy in -r..=r {
            for dx in -r..=r {
                let (zz, yy, xx) = (z as i64 + dz, y as i64 + dy, x as i64 + dx);
                if zz < 0 || yy < 0 || xx < 0 {
                    continue;
                }
                let (zz, yy, xx) = (zz as usize, yy as usize, xx as usize);
                if zz >= nz || yy >= ny || xx >= nx {
                    continue;
                }
                let d2 = (dz * dz + dy * dy + dx * dx) as f32;
                let v = amplitude * (-d2 / (2.0 * sigma * sigma)).exp();
                volume.set(zz, yy, xx, volume.get(zz, yy, xx) + v);
            }
        }
    }
}

/// Integral of a 3D Gaussian of the given amplitude and sigma.
pub fn analytic_mass(amplitude: f32, sigma: f32) -> f32 {
    amplitude * (sigma * (2.0 * std::f32::consts::PI).sqrt()).powi(3)
}
