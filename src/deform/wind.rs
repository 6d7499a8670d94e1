use std::f64::consts::{PI, TAU};

use crate::{
    deform::mesh::{DeformedMesh, MeshVertex, TriangleMesh, compute_bounds, grid_indices},
    foundation::core::Vec2,
    foundation::math::{catmull_rom, keyed_f64_01, smoothstep},
    timeline::model::{MAX_WIND_DIVISIONS, WindSwayConfig},
};

/// Column count of the wind mesh. Bands only bend laterally, so a coarse
/// horizontal resolution is enough.
const WIND_COLS: u32 = 8;

/// Generate the wind-sway deformation mesh for a `width x height` source
/// at time `t`.
///
/// The image is split into `divisions` horizontal bands. Each band gets a
/// sway angle
/// `S_i = (F·sin(c·t − i·d/N) + center) · (1 − (1 − i/N)^4) · axis`,
/// ramping amplitude from zero at the fixed end to full at the free end,
/// and band centerlines accumulate laterally down the chain. Dead zones
/// at either end keep their bands rigid. The output is a pure function of
/// `(width, height, cfg, t)`; with `random_swing` the amplitude varies
/// cycle-to-cycle but reproduces exactly for the same `seed` and
/// `random_pattern`.
pub fn wind_sway_mesh(width: u32, height: u32, cfg: &WindSwayConfig, t: f64) -> DeformedMesh {
    let w = f64::from(width);
    let h = f64::from(height);
    let n = cfg.divisions.clamp(1, MAX_WIND_DIVISIONS);
    let band_len = h / f64::from(n);

    let max_amplitude = PI * cfg.angle / 180.0;
    let c = TAU / cfg.period;
    let d = TAU * cfg.phase_shift / 180.0;
    let center = cfg.center.to_radians();

    // Dead-zone lengths, measured from the fixed end and the free end.
    // `from_bottom` swaps which image edge is the fixed end.
    let (fixed_end_pct, free_end_pct) = if cfg.from_bottom {
        (cfg.bottom_fixed, cfg.top_fixed)
    } else {
        (cfg.top_fixed, cfg.bottom_fixed)
    };
    let fixed_dead = (fixed_end_pct / 100.0).clamp(0.0, 1.0) * h;
    let free_dead = (free_end_pct / 100.0).clamp(0.0, 1.0) * h;

    let amplitude = if cfg.random_swing {
        sampled_amplitude(max_amplitude, cfg, t)
    } else {
        max_amplitude
    };

    // Lateral centerline offsets accumulate from the fixed end outward.
    let rows = n as usize + 1;
    let mut center_x = vec![0.0f64; rows];
    for i in 1..rows {
        let dist = i as f64 * band_len;
        if dist <= fixed_dead || dist > h - free_dead {
            center_x[i] = center_x[i - 1];
            continue;
        }
        let ratio = i as f64 / f64::from(n);
        let ramp = 1.0 - (1.0 - ratio).powi(4);
        let phase = c * t - (i as f64) * d / f64::from(n);
        let sway = (amplitude * phase.sin() + center) * ramp * axis_multiplier(cfg, ratio);
        center_x[i] = center_x[i - 1] + sway.sin() * band_len;
    }

    let mut vertices = Vec::with_capacity(rows * (WIND_COLS as usize + 1));
    for (i, cx) in center_x.iter().enumerate() {
        // Row i sits `i * band_len` from the fixed end; map that back to
        // source v depending on which edge is fixed.
        let v = if cfg.from_bottom {
            1.0 - i as f64 / f64::from(n)
        } else {
            i as f64 / f64::from(n)
        };
        let y = (v - 0.5) * h;
        for jcol in 0..=WIND_COLS {
            let u = f64::from(jcol) / f64::from(WIND_COLS);
            vertices.push(MeshVertex {
                position: Vec2::new(cx + (u - 0.5) * w, y),
                uv: Vec2::new(u, v),
            });
        }
    }

    let bounds = compute_bounds(&vertices);
    DeformedMesh {
        mesh: TriangleMesh {
            vertices,
            indices: grid_indices(n, WIND_COLS),
        },
        bounds,
    }
}

/// Amplitude with randomized swing: a Catmull-Rom sweep across four
/// seeded samples bracketing the current oscillation cycle, so the swing
/// strength drifts smoothly between cycles yet is fully reproducible.
fn sampled_amplitude(max_amplitude: f64, cfg: &WindSwayConfig, t: f64) -> f64 {
    let cycle = (t / cfg.period).floor();
    let frac = (t / cfg.period) - cycle;
    let sample = |k: f64| {
        // Cycle indices can sit below zero for t near 0; bias keeps the
        // hash key non-negative without disturbing adjacency.
        let key = (k + 4096.0).max(0.0) as u64;
        keyed_f64_01(&[cfg.seed, u64::from(cfg.random_pattern), key])
    };
    let mul = catmull_rom(
        sample(cycle - 1.0),
        sample(cycle),
        sample(cycle + 1.0),
        sample(cycle + 2.0),
        frac,
    );
    // Samples are in [0,1]; keep at least half strength so the sway never
    // fully dies between gusts.
    max_amplitude * (0.5 + mul.clamp(0.0, 1.0))
}

/// Attenuation above the axis pivot when `axis_mode` is on, simulating a
/// branch fixed partway up: full sway below the pivot, smooth falloff
/// governed by `axis_strength` over `axis_range` beyond it.
fn axis_multiplier(cfg: &WindSwayConfig, ratio: f64) -> f64 {
    if !cfg.axis_mode || ratio <= cfg.axis_position {
        return 1.0;
    }
    let over = (ratio - cfg.axis_position) / cfg.axis_range.max(1e-9);
    1.0 - cfg.axis_strength * smoothstep(over)
}

#[cfg(test)]
#[path = "../../tests/unit/deform/wind.rs"]
mod tests;
