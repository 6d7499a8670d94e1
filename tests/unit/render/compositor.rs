use super::*;
use crate::{
    animation::track::EPSILON_LIVE,
    assets::provider::NullProvider,
    foundation::core::{Canvas, Fps},
    timeline::model::{ImageAsset, SolidAsset},
};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn timeline(w: u32, h: u32) -> Timeline {
    Timeline::new(
        Canvas {
            width: w,
            height: h,
        },
        Fps::new(30, 1).unwrap(),
    )
}

fn solid(color: [u8; 4]) -> Asset {
    Asset::Solid(SolidAsset { color })
}

fn render(tl: &Timeline, t: f64) -> Surface {
    let post = PostEffects::default();
    let ctx = RenderContext {
        timeline: tl,
        provider: &NullProvider,
        post: &post,
    };
    Compositor::render_frame_at(&ctx, t).unwrap()
}

#[test]
fn empty_timeline_renders_transparent_frame() {
    let tl = timeline(16, 16);
    let frame = render(&tl, 0.0);
    assert!(frame.get_pixels().iter().all(|&b| b == 0));
}

#[test]
fn lowest_track_index_wins_on_top() {
    let mut tl = timeline(16, 16);
    tl.add_clip(solid(RED), 0, 0.0, 5.0);
    tl.add_clip(solid(GREEN), 1, 0.0, 5.0);
    tl.add_clip(solid(BLUE), 2, 0.0, 5.0);

    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(8, 8), RED);
    assert_eq!(frame.pixel(0, 0), RED);
}

#[test]
fn inactive_clips_do_not_draw() {
    let mut tl = timeline(16, 16);
    tl.add_clip(solid(RED), 0, 2.0, 1.0);
    let frame = render(&tl, 0.5);
    assert!(frame.get_pixels().iter().all(|&b| b == 0));
}

#[test]
fn keyframed_x_offsets_the_draw_position() {
    // Canvas 192 wide; card covers it exactly. x animates 0 -> 100 over
    // [0, 5], so at t = 2.5 the card sits 50px right of center: columns
    // left of 50 are empty, columns right of 50 carry the card.
    let mut tl = timeline(192, 108);
    let id = tl.add_clip(solid(RED), 0, 0.0, 5.0);
    {
        let clip = tl.clip_mut(id).unwrap();
        clip.props.x.upsert(0.0, 0.0, EPSILON_LIVE);
        clip.props.x.upsert(5.0, 100.0, EPSILON_LIVE);
    }

    let frame = render(&tl, 2.5);
    assert_eq!(frame.pixel(48, 54)[3], 0);
    assert_eq!(frame.pixel(52, 54), RED);
    assert_eq!(frame.pixel(191, 54), RED);
}

#[test]
fn opacity_zero_clips_are_skipped() {
    let mut tl = timeline(8, 8);
    let below = tl.add_clip(solid(GREEN), 1, 0.0, 5.0);
    let id = tl.add_clip(solid(RED), 0, 0.0, 5.0);
    tl.clip_mut(id)
        .unwrap()
        .props
        .opacity
        .upsert(0.0, 0.0, EPSILON_LIVE);
    let _ = below;

    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(4, 4), GREEN);
}

#[test]
fn not_ready_assets_are_skipped_silently() {
    let mut tl = timeline(8, 8);
    tl.add_clip(solid(GREEN), 1, 0.0, 5.0);
    tl.add_clip(
        Asset::Image(ImageAsset {
            source: "pending.png".into(),
        }),
        0,
        0.0,
        5.0,
    );

    // NullProvider reports NotReady for the image; the pass neither
    // fails nor corrupts the frame.
    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(4, 4), GREEN);
}

#[test]
fn scale_shrinks_the_drawn_footprint() {
    let mut tl = timeline(64, 64);
    let id = tl.add_clip(solid(RED), 0, 0.0, 5.0);
    tl.clip_mut(id)
        .unwrap()
        .props
        .scale
        .upsert(0.0, 0.5, EPSILON_LIVE);

    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(32, 32), RED);
    assert_eq!(frame.pixel(8, 32)[3], 0);
    assert_eq!(frame.pixel(56, 32)[3], 0);
}

#[test]
fn transition_fade_halves_coverage_alpha() {
    let mut tl = timeline(8, 8);
    let id = tl.add_clip(solid(RED), 0, 0.0, 4.0);
    tl.clip_mut(id).unwrap().transition_in = Some(crate::timeline::model::TransitionSpec {
        kind: crate::timeline::model::TransitionKind::Fade,
        duration: 2.0,
    });

    let frame = render(&tl, 1.0);
    let px = frame.pixel(4, 4);
    assert!(px[3] > 120 && px[3] < 135);
}

#[test]
fn mask_limits_clip_to_source_alpha() {
    // A (track 0): white card shifted right by half the canvas, so only
    // the right half is opaque. B (track 1): red card covering the whole
    // frame, masked by A. Output: red on the right half only, and the
    // matte itself does not paint.
    let mut tl = timeline(64, 64);
    let a = tl.add_clip(solid(WHITE), 0, 0.0, 5.0);
    let b = tl.add_clip(solid(RED), 1, 0.0, 5.0);
    tl.clip_mut(a)
        .unwrap()
        .props
        .x
        .upsert(0.0, 32.0, EPSILON_LIVE);
    tl.set_clip_source(b, Some(a)).unwrap();

    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(16, 32)[3], 0);
    assert_eq!(frame.pixel(48, 32), RED);
}

#[test]
fn mask_with_inactive_source_draws_unmasked() {
    let mut tl = timeline(16, 16);
    let a = tl.add_clip(solid(WHITE), 0, 10.0, 1.0);
    let b = tl.add_clip(solid(RED), 1, 0.0, 5.0);
    tl.set_clip_source(b, Some(a)).unwrap();

    // The mask source is not active at t=1; B draws unmasked.
    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(8, 8), RED);
}

#[test]
fn mask_with_dangling_source_draws_unmasked() {
    let mut tl = timeline(16, 16);
    let a = tl.add_clip(solid(WHITE), 0, 0.0, 5.0);
    let b = tl.add_clip(solid(RED), 1, 0.0, 5.0);
    tl.set_clip_source(b, Some(a)).unwrap();
    tl.remove_clip(a);

    let frame = render(&tl, 1.0);
    assert_eq!(frame.pixel(8, 8), RED);
}

#[test]
fn masked_clip_keeps_its_blend_mode_on_the_blit() {
    let mut tl = timeline(16, 16);
    let back = tl.add_clip(solid(GREEN), 2, 0.0, 5.0);
    let a = tl.add_clip(solid(WHITE), 0, 0.0, 5.0);
    let b = tl.add_clip(solid(RED), 1, 0.0, 5.0);
    tl.set_clip_source(b, Some(a)).unwrap();
    tl.clip_mut(b).unwrap().blend = crate::timeline::model::BlendMode::Multiply;
    let _ = back;

    // Multiply of red over green is black.
    let frame = render(&tl, 1.0);
    let px = frame.pixel(8, 8);
    assert_eq!(px[3], 255);
    assert!(px[0] <= 1 && px[1] <= 1);
}

#[test]
fn wind_deformed_clip_still_draws_near_its_footprint() {
    let mut tl = timeline(64, 64);
    let id = tl.add_clip(solid(RED), 0, 0.0, 5.0);
    {
        let clip = tl.clip_mut(id).unwrap();
        clip.props.scale.upsert(0.0, 0.25, EPSILON_LIVE);
        clip.wind.enabled = true;
        clip.wind.angle = 5.0;
        clip.wind.divisions = 6;
    }

    let frame = render(&tl, 0.5);
    // The quarter-scale card still lands around canvas center.
    assert_eq!(frame.pixel(32, 32), RED);
    assert_eq!(frame.pixel(2, 2)[3], 0);
}

#[test]
fn puppet_takes_precedence_over_wind() {
    let mut tl = timeline(64, 64);
    let id = tl.add_clip(solid(RED), 0, 0.0, 5.0);
    {
        let clip = tl.clip_mut(id).unwrap();
        clip.props.scale.upsert(0.0, 0.25, EPSILON_LIVE);
        // Wind configured violently; puppet with no pins (rest grid).
        clip.wind.enabled = true;
        clip.wind.angle = 80.0;
        clip.puppet.enabled = true;
    }

    // With puppet precedence the rest grid draws exactly like the
    // undeformed card; wind alone would shear it sideways.
    let frame = render(&tl, 1.3);
    let mut undeformed = timeline(64, 64);
    let plain = undeformed.add_clip(solid(RED), 0, 0.0, 5.0);
    undeformed
        .clip_mut(plain)
        .unwrap()
        .props
        .scale
        .upsert(0.0, 0.25, EPSILON_LIVE);
    let reference = render(&undeformed, 1.3);

    assert_eq!(frame.pixel(32, 32), reference.pixel(32, 32));
    assert_eq!(frame.pixel(26, 26), reference.pixel(26, 26));
}
