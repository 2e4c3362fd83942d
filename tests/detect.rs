mod common;

use common::synthetic_volume::{analytic_mass, seed_spot};
use spot_decoder::detect::{DetectorOptions, SpotDetector};
use spot_decoder::VolumeF32;

fn detector(opts: DetectorOptions) -> SpotDetector {
    SpotDetector::new(opts).expect("valid detector options")
}

#[test]
fn single_peak_is_recovered_with_accurate_mass() {
    let mut volume = VolumeF32::new(9, 32, 32);
    let (z, y, x, amplitude, sigma) = (4usize, 16usize, 16usize, 50.0f32, 1.0f32);
    seed_spot(&mut volume, z, y, x, amplitude, sigma);

    let spots = detector(DetectorOptions {
        spot_diameter: 7,
        min_mass: 100.0,
        max_size: 5.0,
        separation: 5.0,
        is_volume: true,
        ..Default::default()
    })
    .detect(&volume);

    assert_eq!(spots.len(), 1, "expected exactly one spot, got {spots:?}");
    let spot = &spots[0];
    assert!(
        (spot.z - z as f32).abs() <= 1.0
            && (spot.y - y as f32).abs() <= 1.0
            && (spot.x - x as f32).abs() <= 1.0,
        "spot at ({}, {}, {}) too far from seed ({z}, {y}, {x})",
        spot.z,
        spot.y,
        spot.x
    );
    let expected = analytic_mass(amplitude, sigma);
    let rel = (spot.mass - expected).abs() / expected;
    assert!(
        rel < 0.05,
        "mass {} deviates {:.1}% from analytic {}",
        spot.mass,
        rel * 100.0,
        expected
    );
}

#[test]
fn close_peaks_collapse_to_the_heavier_one() {
    let mut volume = VolumeF32::new(5, 24, 24);
    // 4 voxels apart, closer than the separation of 5
    seed_spot(&mut volume, 2, 10, 10, 50.0, 0.8);
    seed_spot(&mut volume, 2, 10, 14, 30.0, 0.8);

    let spots = detector(DetectorOptions {
        spot_diameter: 7,
        min_mass: 1.0,
        max_size: 10.0,
        separation: 5.0,
        is_volume: true,
        ..Default::default()
    })
    .detect(&volume);

    assert_eq!(spots.len(), 1, "expected the conflict to collapse, got {spots:?}");
    assert!(
        (spots[0].x - 10.0).abs() <= 1.0,
        "survivor should sit at the heavier peak, got x={}",
        spots[0].x
    );
}

#[test]
fn no_two_spots_closer_than_separation() {
    let mut volume = VolumeF32::new(5, 40, 40);
    for (y, x) in [(8, 8), (8, 20), (20, 8), (20, 20), (32, 32)] {
        seed_spot(&mut volume, 2, y, x, 40.0, 0.8);
    }

    let separation = 5.0f32;
    let spots = detector(DetectorOptions {
        spot_diameter: 5,
        min_mass: 1.0,
        max_size: 10.0,
        separation,
        is_volume: true,
        ..Default::default()
    })
    .detect(&volume);

    assert_eq!(spots.len(), 5);
    for (i, a) in spots.iter().enumerate() {
        for b in spots.iter().skip(i + 1) {
            let d = ((a.z - b.z).powi(2) + (a.y - b.y).powi(2) + (a.x - b.x).powi(2)).sqrt();
            assert!(
                d >= separation,
                "spots {a:?} and {b:?} are {d:.2} apart, below {separation}"
            );
        }
    }
}

#[test]
fn dim_and_oversized_candidates_are_gated() {
    let mut volume = VolumeF32::new(5, 32, 32);
    seed_spot(&mut volume, 2, 8, 8, 50.0, 0.8); // compact and bright
    seed_spot(&mut volume, 2, 24, 24, 0.5, 0.8); // too dim
    seed_spot(&mut volume, 2, 8, 24, 50.0, 2.5); // too broad

    let spots = detector(DetectorOptions {
        spot_diameter: 7,
        min_mass: 50.0,
        max_size: 2.0,
        separation: 5.0,
        is_volume: true,
        ..Default::default()
    })
    .detect(&volume);

    assert_eq!(spots.len(), 1, "only the bright compact spot should pass");
    assert!((spots[0].y - 8.0).abs() <= 1.0);
    assert!((spots[0].x - 8.0).abs() <= 1.0);
}

#[test]
fn empty_volume_yields_empty_result() {
    let volume = VolumeF32::new(5, 16, 16);
    let spots = detector(DetectorOptions::default()).detect(&volume);
    assert!(spots.is_empty());
}
