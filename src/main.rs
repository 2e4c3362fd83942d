use spot_decoder::codebook::{Codebook, CodebookEntry};
use spot_decoder::config::PipelineConfig;
use spot_decoder::detect::DetectorOptions;
use spot_decoder::events::LogSink;
use spot_decoder::filter::{ClipConfig, GaussianConfig};
use spot_decoder::{FieldImage, PipelineOrchestrator, VolumeF32};

/// Stamp one Gaussian point source into the volume.
fn seed_spot(volume: &mut VolumeF32, z: usize, y: usize, x: usize, amplitude: f32, sigma: f32) {
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

fn main() {
    // Demo stub: seeds three point sources into a synthetic stack and runs
    // the full decode, with the tuning the original smFISH workflow uses.
    let config = PipelineConfig {
        clip_pre: ClipConfig {
            p_min: 50.0,
            p_max: 100.0,
            ..Default::default()
        },
        low_pass: GaussianConfig {
            sigma: [1.0, 0.0, 0.0],
            is_volume: true,
        },
        clip_post: ClipConfig {
            p_min: 99.0,
            p_max: 100.0,
            is_volume: true,
            ..Default::default()
        },
        detector: DetectorOptions {
            spot_diameter: 7,
            min_mass: 0.1,
            separation: 5.0,
            ..Default::default()
        },
        intensity_threshold: 0.025,
        workers: 2,
        ..Default::default()
    };

    let codebook = Codebook::new(1, 1, vec![CodebookEntry::new("ACTB", &[(0, 0, 1.0)])])
        .expect("valid demo codebook");
    let orchestrator =
        PipelineOrchestrator::from_config(&config, codebook).expect("valid demo config");

    let mut volume = VolumeF32::new(5, 64, 64);
    seed_spot(&mut volume, 2, 16, 16, 100.0, 1.0);
    seed_spot(&mut volume, 2, 32, 48, 80.0, 1.0);
    seed_spot(&mut volume, 3, 50, 20, 120.0, 1.0);

    let images = vec![FieldImage {
        round: 0,
        channel: 0,
        volume,
    }];
    let report = orchestrator.run(images, &LogSink).expect("demo run");
    println!(
        "decoded={} failures={} latency_ms={:.3}",
        report.table.len(),
        report.failures.len(),
        report.timing.total_ms
    );
    for row in &report.table.rows {
        println!(
            "  {} at (z={:.2}, y={:.2}, x={:.2}) mass={:.1}",
            row.target, row.record.z, row.record.y, row.record.x, row.record.mass
        );
    }
}
