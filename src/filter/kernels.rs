//! Separable 1D kernels and convolution passes used by the filter stages.
//!
//! All passes clamp at the borders (edge replication) and run in
//! O(pixels × taps). A 2D smooth is two 1D passes; the z pass of a volume
//! filter reuses the column pass by treating the stack as an
//! `nz × (ny * nx)` image.

/// Normalized Gaussian taps for the given sigma, truncated at four sigma.
/// A non-positive sigma yields the identity kernel.
pub fn gaussian_taps(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (4.0 * sigma).ceil().max(1.0) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut taps = Vec::with_capacity(2 * radius + 1);
    for k in 0..=2 * radius {
        let d = k as f32 - radius as f32;
        taps.push((-d * d / denom).exp());
    }
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Uniform boxcar taps with the given half-width (`2 * half_width + 1` taps).
pub fn boxcar_taps(half_width: usize) -> Vec<f32> {
    let n = 2 * half_width + 1;
    vec![1.0 / n as f32; n]
}

/// Horizontal pass over a `w × h` row-major plane, writing into `dst`.
pub fn convolve_rows(src: &[f32], dst: &mut [f32], w: usize, h: usize, taps: &[f32]) {
    let r = taps.len() / 2;
    for y in 0..h {
        let row = &src[y * w..y * w + w];
        let out = &mut dst[y * w..y * w + w];
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, t) in taps.iter().enumerate() {
                let xi = (x + k).saturating_sub(r).min(w - 1);
                acc += t * row[xi];
            }
            out[x] = acc;
        }
    }
}

/// Vertical pass over a `w × h` row-major plane, writing into `dst`.
/// Row-wise accumulation keeps the inner loop contiguous.
pub fn convolve_cols(src: &[f32], dst: &mut [f32], w: usize, h: usize, taps: &[f32]) {
    let r = taps.len() / 2;
    for y in 0..h {
        let out = &mut dst[y * w..y * w + w];
        out.fill(0.0);
        for (k, t) in taps.iter().enumerate() {
            let sy = (y + k).saturating_sub(r).min(h - 1);
            let srow = &src[sy * w..sy * w + w];
            for (o, s) in out.iter_mut().zip(srow) {
                *o += t * s;
            }
        }
    }
}
