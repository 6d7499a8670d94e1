use super::*;
use crate::{
    assets::provider::NullProvider,
    foundation::core::Canvas,
    render::post::PostEffects,
    render::surface::RasterSurface,
    timeline::model::{Asset, SolidAsset},
    timeline::project::Timeline,
};

fn ctx_timeline() -> Timeline {
    let mut tl = Timeline::new(
        Canvas {
            width: 8,
            height: 8,
        },
        Fps::new(10, 1).unwrap(),
    );
    tl.add_clip(
        Asset::Solid(SolidAsset {
            color: [255, 0, 0, 255],
        }),
        0,
        0.0,
        1.0,
    );
    tl
}

#[test]
fn range_steps_at_frame_interval_without_drops_or_dups() {
    let tl = ctx_timeline();
    let post = PostEffects::default();
    let ctx = RenderContext {
        timeline: &tl,
        provider: &NullProvider,
        post: &post,
    };

    let mut indices = Vec::new();
    let stats = render_range(&ctx, 0.0, 1.0, Fps::new(10, 1).unwrap(), |i, frame| {
        indices.push(i);
        assert_eq!(frame.width(), 8);
        Ok(())
    })
    .unwrap();

    assert_eq!(stats.frames, 10);
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
}

#[test]
fn empty_range_renders_nothing() {
    let tl = ctx_timeline();
    let post = PostEffects::default();
    let ctx = RenderContext {
        timeline: &tl,
        provider: &NullProvider,
        post: &post,
    };
    let stats = render_range(&ctx, 2.0, 2.0, Fps::new(10, 1).unwrap(), |_, _| Ok(()))
        .unwrap();
    assert_eq!(stats.frames, 0);
}

#[test]
fn invalid_range_is_rejected() {
    let tl = ctx_timeline();
    let post = PostEffects::default();
    let ctx = RenderContext {
        timeline: &tl,
        provider: &NullProvider,
        post: &post,
    };
    assert!(render_range(&ctx, 3.0, 1.0, Fps::new(10, 1).unwrap(), |_, _| Ok(())).is_err());
    assert!(
        render_range(&ctx, f64::NAN, 1.0, Fps::new(10, 1).unwrap(), |_, _| Ok(())).is_err()
    );
}

#[test]
fn sink_errors_abort_the_run() {
    let tl = ctx_timeline();
    let post = PostEffects::default();
    let ctx = RenderContext {
        timeline: &tl,
        provider: &NullProvider,
        post: &post,
    };
    let mut delivered = 0u32;
    let result = render_range(&ctx, 0.0, 1.0, Fps::new(10, 1).unwrap(), |i, _| {
        delivered += 1;
        if i == 2 {
            Err(crate::foundation::error::StarlitError::render("sink full"))
        } else {
            Ok(())
        }
    });
    assert!(result.is_err());
    assert_eq!(delivered, 3);
}

#[test]
fn export_is_deterministic_across_runs() {
    let tl = ctx_timeline();
    let post = PostEffects::default();
    let ctx = RenderContext {
        timeline: &tl,
        provider: &NullProvider,
        post: &post,
    };

    let collect = || {
        let mut frames = Vec::new();
        render_range(&ctx, 0.0, 0.5, Fps::new(10, 1).unwrap(), |_, f| {
            frames.push(f.get_pixels().to_vec());
            Ok(())
        })
        .unwrap();
        frames
    };
    assert_eq!(collect(), collect());
}
