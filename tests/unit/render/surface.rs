use super::*;
use crate::foundation::core::Vec2;

fn red() -> [u8; 4] {
    [255, 0, 0, 255]
}

#[test]
fn new_surface_is_transparent() {
    let s = Surface::new(4, 4);
    assert!(s.get_pixels().iter().all(|&b| b == 0));
    assert_eq!(s.size(), (4, 4));
}

#[test]
fn from_pixels_checks_length() {
    assert!(Surface::from_pixels(2, 2, vec![0u8; 16]).is_ok());
    assert!(Surface::from_pixels(2, 2, vec![0u8; 15]).is_err());
}

#[test]
fn pixel_access_is_clamped_and_safe() {
    let mut s = Surface::new(2, 2);
    s.put_pixel(0, 0, red());
    assert_eq!(s.pixel(0, 0), red());
    assert_eq!(s.pixel(-1, 0), [0, 0, 0, 0]);
    assert_eq!(s.pixel(5, 5), [0, 0, 0, 0]);
    // Out-of-bounds writes are dropped, not wrapped.
    s.put_pixel(9, 9, red());
    assert_eq!(s.pixel(1, 1), [0, 0, 0, 0]);
}

#[test]
fn bilinear_sampling_blends_neighbors() {
    let mut s = Surface::new(2, 1);
    s.put_pixel(0, 0, [0, 0, 0, 255]);
    s.put_pixel(1, 0, [200, 0, 0, 255]);
    let mid = s.sample_bilinear(0.5, 0.0);
    assert_eq!(mid[0], 100);
    assert_eq!(mid[3], 255);
}

#[test]
fn draw_identity_transform_copies_pixels() {
    let mut src = Surface::new(2, 2);
    src.fill(red());
    let mut dst = Surface::new(4, 4);
    dst.draw_transformed_image(&src, Affine::IDENTITY, 1.0, BlendMode::Normal);
    assert_eq!(dst.pixel(0, 0), red());
    assert_eq!(dst.pixel(1, 1), red());
    assert_eq!(dst.pixel(3, 3), [0, 0, 0, 0]);
}

#[test]
fn draw_translate_offsets_content() {
    let mut src = Surface::new(1, 1);
    src.fill(red());
    let mut dst = Surface::new(4, 4);
    dst.draw_transformed_image(
        &src,
        Affine::translate(Vec2::new(2.0, 1.0)),
        1.0,
        BlendMode::Normal,
    );
    assert_eq!(dst.pixel(2, 1), red());
    assert_eq!(dst.pixel(0, 0), [0, 0, 0, 0]);
}

#[test]
fn draw_respects_opacity() {
    let mut src = Surface::new(2, 2);
    src.fill(red());
    let mut dst = Surface::new(2, 2);
    dst.draw_transformed_image(&src, Affine::IDENTITY, 0.5, BlendMode::Normal);
    let px = dst.pixel(0, 0);
    assert!(px[3] > 120 && px[3] < 135);
    assert!(px[0] > 120 && px[0] < 135);
}

#[test]
fn draw_degenerate_transform_is_skipped() {
    let mut src = Surface::new(2, 2);
    src.fill(red());
    let mut dst = Surface::new(4, 4);
    dst.draw_transformed_image(&src, Affine::scale(0.0), 1.0, BlendMode::Normal);
    assert!(dst.get_pixels().iter().all(|&b| b == 0));
}

#[test]
fn scale_up_covers_expected_region() {
    let mut src = Surface::new(2, 2);
    src.fill(red());
    let mut dst = Surface::new(8, 8);
    dst.draw_transformed_image(&src, Affine::scale(2.0), 1.0, BlendMode::Normal);
    assert_eq!(dst.pixel(0, 0), red());
    assert_eq!(dst.pixel(3, 3), red());
    assert_eq!(dst.pixel(5, 5), [0, 0, 0, 0]);
}

#[test]
fn composite_full_surface_over() {
    let mut below = Surface::new(2, 1);
    below.fill([0, 255, 0, 255]);
    let mut above = Surface::new(2, 1);
    above.put_pixel(0, 0, red());

    below.composite_with_blend_mode(&above, 1.0, BlendMode::Normal);
    assert_eq!(below.pixel(0, 0), red());
    assert_eq!(below.pixel(1, 0), [0, 255, 0, 255]);
}

#[test]
fn mask_destination_in_keeps_only_opaque_mask_area() {
    let mut layer = Surface::new(2, 1);
    layer.fill(red());
    let mut mask = Surface::new(2, 1);
    mask.put_pixel(0, 0, [255, 255, 255, 255]);

    layer.mask_destination_in(&mask);
    assert_eq!(layer.pixel(0, 0), red());
    assert_eq!(layer.pixel(1, 0), [0, 0, 0, 0]);
}

#[test]
fn mask_partial_alpha_scales_destination() {
    let mut layer = Surface::new(1, 1);
    layer.fill(red());
    let mut mask = Surface::new(1, 1);
    mask.fill([128, 128, 128, 128]);

    layer.mask_destination_in(&mask);
    let px = layer.pixel(0, 0);
    assert!(px[3] > 120 && px[3] < 135);
}

#[test]
fn set_pixels_requires_matching_length() {
    let mut s = Surface::new(2, 2);
    assert!(s.set_pixels(&[0u8; 16]).is_ok());
    assert!(s.set_pixels(&[0u8; 4]).is_err());
}
