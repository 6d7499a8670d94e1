use crate::{
    deform::mesh::{DeformedMesh, MeshVertex, TriangleMesh, compute_bounds, grid_indices},
    foundation::core::Vec2,
    timeline::model::PuppetConfig,
};

/// Generate the puppet-warp deformation mesh for a `width x height`
/// source at clip-local time `t`.
///
/// A regular grid (fineness from `grid_density`) is displaced by the
/// pins: each pin contributes its keyframed displacement to every vertex,
/// weighted by `exp(-distance * falloff / influence_radius)` of the
/// vertex's rest distance to the pin's rest position. Stiffness widens
/// the influence radius and softens falloff, so high stiffness propagates
/// displacement rigidly and low stiffness deforms locally.
///
/// With no pins the output grid is exactly the undeformed rest grid.
pub fn puppet_warp_mesh(width: u32, height: u32, cfg: &PuppetConfig, t: f64) -> DeformedMesh {
    let w = f64::from(width);
    let h = f64::from(height);
    let (rows, cols) = grid_resolution(width, height, cfg.grid_density);

    let stiffness = cfg.stiffness.clamp(0.0, 1.0);
    let influence_radius = w.max(h) * 0.3 * (0.5 + stiffness * 1.5);
    let falloff = 2.0 - stiffness * 1.5;

    // Pin rest/current positions in center-relative pixels.
    let pins: Vec<(Vec2, Vec2)> = cfg
        .pins
        .iter()
        .map(|pin| {
            let rest = to_pixels(pin.rest(), w, h);
            let current = to_pixels(pin.position_at(t), w, h);
            (rest, current - rest)
        })
        .collect();

    let mut vertices = Vec::with_capacity((rows as usize + 1) * (cols as usize + 1));
    for r in 0..=rows {
        let v = f64::from(r) / f64::from(rows);
        for c in 0..=cols {
            let u = f64::from(c) / f64::from(cols);
            let rest = Vec2::new((u - 0.5) * w, (v - 0.5) * h);

            let mut displaced = rest;
            if influence_radius > 0.0 {
                for (pin_rest, disp) in &pins {
                    let dist = (rest - *pin_rest).hypot();
                    let weight = (-dist * falloff / influence_radius).exp();
                    displaced += *disp * weight;
                }
            }

            vertices.push(MeshVertex {
                position: displaced,
                uv: Vec2::new(u, v),
            });
        }
    }

    let bounds = compute_bounds(&vertices);
    DeformedMesh {
        mesh: TriangleMesh {
            vertices,
            indices: grid_indices(rows, cols),
        },
        bounds,
    }
}

/// Grid cell counts for the given density: density is the number of
/// cells along the longer image axis, the shorter axis keeps cells
/// square. Clamped so degenerate configs still mesh.
fn grid_resolution(width: u32, height: u32, density: u32) -> (u32, u32) {
    let density = density.clamp(2, 64);
    let w = f64::from(width.max(1));
    let h = f64::from(height.max(1));
    let cell = w.max(h) / f64::from(density);
    let cols = (w / cell).ceil().max(1.0) as u32;
    let rows = (h / cell).ceil().max(1.0) as u32;
    (rows, cols)
}

fn to_pixels(unit: Vec2, w: f64, h: f64) -> Vec2 {
    Vec2::new((unit.x - 0.5) * w, (unit.y - 0.5) * h)
}

#[cfg(test)]
#[path = "../../tests/unit/deform/puppet.rs"]
mod tests;
