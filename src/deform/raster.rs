use crate::{
    deform::mesh::DeformedMesh,
    foundation::core::Vec2,
    render::surface::Surface,
};

/// Extra pixels around the deformed bounding box so bilinear sampling at
/// mesh edges never clips.
const BOUNDS_PAD: f64 = 2.0;

/// A deformed clip image rendered at bounding-box size.
#[derive(Clone, Debug)]
pub struct DeformedSprite {
    /// Rasterized pixels, transparent outside the mesh.
    pub surface: Surface,
    /// Buffer top-left relative to the undeformed image center, pixels.
    pub origin: Vec2,
}

/// Rasterize a deformation mesh with `src` as its texture.
///
/// Each triangle maps buffer pixels back into source UV space through its
/// barycentric coordinates and samples the source bilinearly. Triangles
/// with a near-zero determinant (folded or collapsed cells) are skipped
/// rather than letting non-finite math reach the pixels. Returns `None`
/// when the deformed bounds are empty.
pub fn rasterize_mesh(src: &Surface, deformed: &DeformedMesh) -> Option<DeformedSprite> {
    let bounds = deformed.bounds.padded(BOUNDS_PAD);
    let out_w = bounds.width().ceil() as u32;
    let out_h = bounds.height().ceil() as u32;
    if out_w == 0 || out_h == 0 || src.width() == 0 || src.height() == 0 {
        return None;
    }

    let mut surface = Surface::new(out_w, out_h);
    let src_w = f64::from(src.width());
    let src_h = f64::from(src.height());

    for tri in &deformed.mesh.indices {
        let [i0, i1, i2] = *tri;
        let v0 = &deformed.mesh.vertices[i0 as usize];
        let v1 = &deformed.mesh.vertices[i1 as usize];
        let v2 = &deformed.mesh.vertices[i2 as usize];

        // Positions in buffer space.
        let p0 = v0.position - bounds.min;
        let p1 = v1.position - bounds.min;
        let p2 = v2.position - bounds.min;

        let area = edge(p0, p1, p2);
        if area.abs() < 1e-9 {
            continue;
        }

        let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as i64;
        let max_x = p0.x.max(p1.x).max(p2.x).ceil().min(f64::from(out_w)) as i64;
        let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as i64;
        let max_y = p0.y.max(p1.y).max(p2.y).ceil().min(f64::from(out_h)) as i64;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let w0 = edge(p1, p2, p) / area;
                let w1 = edge(p2, p0, p) / area;
                let w2 = edge(p0, p1, p) / area;
                if w0 < -1e-6 || w1 < -1e-6 || w2 < -1e-6 {
                    continue;
                }

                let u = w0 * v0.uv.x + w1 * v1.uv.x + w2 * v2.uv.x;
                let v = w0 * v0.uv.y + w1 * v1.uv.y + w2 * v2.uv.y;
                let px = src.sample_bilinear(u * (src_w - 1.0), v * (src_h - 1.0));
                if px[3] == 0 {
                    continue;
                }
                surface.put_pixel(x, y, px);
            }
        }
    }

    Some(DeformedSprite {
        surface,
        origin: bounds.min,
    })
}

/// Twice the signed area of triangle `(a, b, c)`.
fn edge(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
#[path = "../../tests/unit/deform/raster.rs"]
mod tests;
