use super::*;
use crate::{
    deform::puppet::puppet_warp_mesh,
    render::surface::RasterSurface,
    timeline::model::PuppetConfig,
};

fn solid_source(w: u32, h: u32, px: [u8; 4]) -> Surface {
    let mut s = Surface::new(w, h);
    s.fill(px);
    s
}

#[test]
fn undeformed_grid_reproduces_the_source_footprint() {
    let src = solid_source(40, 20, [255, 0, 0, 255]);
    let cfg = PuppetConfig {
        enabled: true,
        pins: vec![],
        ..PuppetConfig::default()
    };
    let mesh = puppet_warp_mesh(40, 20, &cfg, 0.0);
    let sprite = rasterize_mesh(&src, &mesh).unwrap();

    // Buffer covers the padded bounds.
    assert!(sprite.surface.width() >= 40);
    assert!(sprite.surface.height() >= 20);
    assert!(sprite.origin.x <= -20.0);

    // The interior of the footprint is filled with the source color.
    let cx = (-sprite.origin.x) as i64;
    let cy = (-sprite.origin.y) as i64;
    assert_eq!(sprite.surface.pixel(cx, cy), [255, 0, 0, 255]);

    // Corners outside the padded footprint stay transparent.
    assert_eq!(sprite.surface.pixel(0, 0)[3], 0);
}

#[test]
fn coverage_is_contiguous_inside_the_mesh() {
    let src = solid_source(32, 32, [0, 255, 0, 255]);
    let cfg = PuppetConfig {
        enabled: true,
        pins: vec![],
        ..PuppetConfig::default()
    };
    let mesh = puppet_warp_mesh(32, 32, &cfg, 0.0);
    let sprite = rasterize_mesh(&src, &mesh).unwrap();

    let cx = -sprite.origin.x;
    let cy = -sprite.origin.y;
    // Scan a horizontal line through the middle of the footprint: no
    // holes between triangle seams.
    let y = cy as i64;
    for x in 0..30 {
        let px = sprite.surface.pixel((cx - 14.0) as i64 + x, y);
        assert_eq!(px[3], 255, "hole at column {x}");
    }
}

#[test]
fn degenerate_triangles_are_skipped() {
    use crate::deform::mesh::{BoundingBox, DeformedMesh, MeshVertex, TriangleMesh};
    use crate::foundation::core::Vec2;

    // All three vertices collinear: zero-area triangle, nothing drawn,
    // nothing non-finite.
    let v = |x: f64, y: f64| MeshVertex {
        position: Vec2::new(x, y),
        uv: Vec2::new(0.5, 0.5),
    };
    let mesh = DeformedMesh {
        mesh: TriangleMesh {
            vertices: vec![v(0.0, 0.0), v(5.0, 0.0), v(10.0, 0.0)],
            indices: vec![[0, 1, 2]],
        },
        bounds: BoundingBox {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 10.0),
        },
    };
    let src = solid_source(8, 8, [255, 255, 255, 255]);
    let sprite = rasterize_mesh(&src, &mesh).unwrap();
    assert!(sprite.surface.get_pixels().iter().all(|&b| b == 0));
}

#[test]
fn empty_source_yields_none() {
    use crate::deform::mesh::{BoundingBox, DeformedMesh, TriangleMesh};
    use crate::foundation::core::Vec2;

    let mesh = DeformedMesh {
        mesh: TriangleMesh {
            vertices: vec![],
            indices: vec![],
        },
        bounds: BoundingBox {
            min: Vec2::ZERO,
            max: Vec2::ZERO,
        },
    };
    let src = solid_source(0, 0, [0, 0, 0, 0]);
    assert!(rasterize_mesh(&src, &mesh).is_none());
}
