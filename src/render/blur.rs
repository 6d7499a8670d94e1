use rayon::prelude::*;

use crate::{
    foundation::error::{StarlitError, StarlitResult},
    foundation::math::Rng64,
    render::surface::{RasterSurface, Surface},
    timeline::model::BlurAxis,
};

/// Separable gaussian blur over a premultiplied RGBA8 surface, optionally
/// restricted to one axis. `sigma` defaults to `radius / 2` when not
/// meaningful, matching the usual kernel parameterization.
pub fn gaussian_blur(src: &Surface, radius: u32, axis: BlurAxis) -> StarlitResult<Surface> {
    if radius == 0 {
        return Ok(src.clone());
    }
    let (w, h) = (src.width(), src.height());
    if w == 0 || h == 0 {
        return Ok(src.clone());
    }

    let kernel = gaussian_kernel_q16(radius, radius as f32 / 2.0)?;
    let mut out = src.clone();

    match axis {
        BlurAxis::Both => {
            let mut tmp = Surface::new(w, h);
            horizontal_pass(src, &mut tmp, &kernel);
            vertical_pass(&tmp, &mut out, &kernel);
        }
        BlurAxis::Horizontal => horizontal_pass(src, &mut out, &kernel),
        BlurAxis::Vertical => vertical_pass(src, &mut out, &kernel),
    }
    Ok(out)
}

/// Fixed-point (Q16) gaussian kernel weights summing to exactly 1.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> StarlitResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StarlitError::render("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Fold rounding error into the center tap so energy is conserved.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &Surface, dst: &mut Surface, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = src.width() as i64;
    let src_px = src.get_pixels();
    let row_bytes = (w as usize) * 4;

    dst.data_mut()
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src_px[y * row_bytes..(y + 1) * row_bytes];
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i64 - radius).clamp(0, w - 1) as usize;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src_row[sx * 4 + c]);
                    }
                }
                for c in 0..4 {
                    row[(x as usize) * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &Surface, dst: &mut Surface, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = src.width() as i64;
    let h = src.height() as i64;
    let src_px = src.get_pixels();
    let row_bytes = (w as usize) * 4;

    dst.data_mut()
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w as usize {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as i64 + ki as i64 - radius).clamp(0, h - 1) as usize;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src_px[sy * row_bytes + x * 4 + c]);
                    }
                }
                for c in 0..4 {
                    row[x * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

/// Lens (depth-of-field) blur: each row's sampling radius grows with its
/// vertical distance from a focus band, and pixels gather through a
/// jittered two-ring circular kernel for the characteristic bokeh-ish
/// falloff. Rows inside the band pass through untouched.
///
/// The kernel jitter comes from a fixed seed, so output is a pure
/// function of the inputs.
pub fn lens_blur(
    src: &Surface,
    max_radius: u32,
    focus_center: f64,
    focus_width: f64,
) -> StarlitResult<Surface> {
    let (w, h) = (src.width(), src.height());
    if max_radius == 0 || w == 0 || h == 0 {
        return Ok(src.clone());
    }

    let kernel = ring_kernel();
    let mut out = src.clone();
    let row_bytes = (w as usize) * 4;
    let half_band = (focus_width.clamp(0.0, 1.0) / 2.0).max(0.0);
    let center = focus_center.clamp(0.0, 1.0);

    out.data_mut()
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let v = (y as f64 + 0.5) / f64::from(h);
            let dist = (v - center).abs();
            if dist <= half_band {
                return;
            }
            // Radius ramps from 0 at the band edge to max at the frame edge.
            let reach = (1.0 - center).max(center) - half_band;
            let t = if reach > 0.0 {
                ((dist - half_band) / reach).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let radius = t * f64::from(max_radius);
            if radius < 0.5 {
                return;
            }

            for x in 0..w as usize {
                let mut acc = [0.0f64; 4];
                let mut count = 0.0f64;
                for (dx, dy) in &kernel {
                    let sx = x as f64 + dx * radius;
                    let sy = y as f64 + dy * radius;
                    if sx < 0.0 || sy < 0.0 || sx >= f64::from(w) || sy >= f64::from(h) {
                        continue;
                    }
                    let px = src.sample_bilinear(sx, sy);
                    for c in 0..4 {
                        acc[c] += f64::from(px[c]);
                    }
                    count += 1.0;
                }
                if count > 0.0 {
                    for c in 0..4 {
                        row[x * 4 + c] = (acc[c] / count).round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        });
    Ok(out)
}

/// Unit sampling offsets: center tap plus two jittered hexagonal rings.
fn ring_kernel() -> Vec<(f64, f64)> {
    let mut rng = Rng64::new(0x51A2_11F0);
    let mut taps = vec![(0.0, 0.0)];
    for (ring_radius, spokes) in [(0.5, 6u32), (1.0, 12u32)] {
        for i in 0..spokes {
            let jitter = (rng.next_f64_01() - 0.5) * (std::f64::consts::TAU / f64::from(spokes)) * 0.5;
            let theta = std::f64::consts::TAU * f64::from(i) / f64::from(spokes) + jitter;
            taps.push((ring_radius * theta.cos(), ring_radius * theta.sin()));
        }
    }
    taps
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
