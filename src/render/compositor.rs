use crate::{
    assets::procedural,
    assets::provider::{AssetProvider, SourceFrame},
    deform::puppet::puppet_warp_mesh,
    deform::raster::{DeformedSprite, rasterize_mesh},
    deform::wind::wind_sway_mesh,
    eval::evaluator::{EvaluatedClip, Evaluator},
    foundation::core::{Affine, Vec2},
    foundation::error::StarlitResult,
    render::blur::{gaussian_blur, lens_blur},
    render::post::{PostEffects, apply_post_effects},
    render::surface::{RasterSurface, Surface},
    timeline::model::{Asset, BlendMode, Clip},
    timeline::project::Timeline,
};

/// Everything one compositing pass needs, assembled by the caller and
/// immutable for the duration of the pass. The compositing functions are
/// pure over `(context, time)`; interactive state lives with the caller.
pub struct RenderContext<'a> {
    /// Timeline being rendered.
    pub timeline: &'a Timeline,
    /// Boundary to decoded media.
    pub provider: &'a dyn AssetProvider,
    /// Active full-frame post effect configuration.
    pub post: &'a PostEffects,
}

/// The frame compositor: resolves the active clip set for a query time
/// and draws it back-to-front into a fresh frame buffer.
pub struct Compositor;

impl Compositor {
    /// Render the fully-composited frame at time `t`.
    ///
    /// This is the sole primitive export drivers need; it is also what
    /// interactive scrubbing calls (through the caller-side coalescer).
    /// Clips whose sources are not ready yet are skipped silently — the
    /// pass never fails on transiently-missing pixels.
    #[tracing::instrument(skip(ctx))]
    pub fn render_frame_at(ctx: &RenderContext<'_>, t: f64) -> StarlitResult<Surface> {
        let canvas = ctx.timeline.canvas;
        let mut frame = Surface::new(canvas.width, canvas.height);

        // Back-to-front: highest track first, track 0 last and on top.
        let nodes = Evaluator::evaluate_frame(ctx.timeline, t)?;

        // A clip serving as another active clip's matte contributes its
        // alpha through the masking pass only, never as a visible layer.
        let matte_sources: std::collections::BTreeSet<_> = nodes
            .iter()
            .filter_map(|n| ctx.timeline.clip(n.clip_id))
            .filter_map(|c| c.clip_source)
            .filter(|id| {
                ctx.timeline
                    .clip(*id)
                    .is_some_and(|source| source.is_active_at(t))
            })
            .collect();

        for node in &nodes {
            if matte_sources.contains(&node.clip_id) {
                continue;
            }
            draw_clip(ctx, &mut frame, node, t)?;
        }

        apply_post_effects(&mut frame, ctx.post, t)?;
        Ok(frame)
    }
}

fn draw_clip(
    ctx: &RenderContext<'_>,
    frame: &mut Surface,
    node: &EvaluatedClip,
    t: f64,
) -> StarlitResult<()> {
    let Some(clip) = ctx.timeline.clip(node.clip_id) else {
        return Ok(());
    };
    if node.opacity <= 0.0 {
        return Ok(());
    }

    // Masking routes the clip through an off-screen buffer pair; the
    // unmasked path draws straight into the shared frame.
    let mask_clip = clip
        .clip_source
        .and_then(|id| ctx.timeline.clip(id))
        .filter(|source| source.is_active_at(t));

    match mask_clip {
        Some(source) => {
            let mut layer = frame.new_like();
            if !render_clip_content(ctx, &mut layer, clip, node, BlendMode::Normal)? {
                return Ok(());
            }

            // The mask buffer renders the source clip's current frame,
            // transform-resolved exactly like a normal draw.
            let mut mask = frame.new_like();
            let mask_node = Evaluator::evaluate_clip(ctx.timeline, source, t);
            render_clip_content(ctx, &mut mask, source, &mask_node, BlendMode::Normal)?;

            // Keep layer pixels only where the mask is opaque, then blit
            // with the clip's own blend mode.
            layer.mask_destination_in(&mask);
            frame.composite_with_blend_mode(&layer, 1.0, clip.blend);
            Ok(())
        }
        None => {
            render_clip_content(ctx, frame, clip, node, clip.blend)?;
            Ok(())
        }
    }
}

/// Resolve a clip's source pixels, run its spatial and blur effects, and
/// draw it into `target` under the node's transform and opacity.
///
/// Returns whether anything was drawn (`false` when the source is not
/// ready this pass).
fn render_clip_content(
    ctx: &RenderContext<'_>,
    target: &mut Surface,
    clip: &Clip,
    node: &EvaluatedClip,
    blend: BlendMode,
) -> StarlitResult<bool> {
    let Some(source) = resolve_source(ctx, clip, node.source_time) else {
        return Ok(false);
    };

    let w = f64::from(source.width());
    let h = f64::from(source.height());
    // Content top-left in anchor-local coordinates.
    let anchor_offset = Vec2::new(-w * clip.anchor.x, -h * clip.anchor.y);

    // One spatial deformation path per clip: puppet takes precedence when
    // both are configured.
    let deformed: Option<DeformedSprite> = if clip.puppet.enabled {
        rasterize_mesh(&source, &puppet_warp_mesh(source.width(), source.height(), &clip.puppet, node.local_time))
    } else if clip.wind.enabled {
        rasterize_mesh(&source, &wind_sway_mesh(source.width(), source.height(), &clip.wind, node.local_time))
    } else {
        None
    };

    let (mut content, local_top_left) = match deformed {
        Some(sprite) => {
            // Sprite origin is relative to the undeformed image center.
            let center_local = Vec2::new(anchor_offset.x + w / 2.0, anchor_offset.y + h / 2.0);
            let top_left = center_local + sprite.origin;
            (sprite.surface, top_left)
        }
        None => (source, anchor_offset),
    };

    if clip.gaussian_blur.enabled && clip.gaussian_blur.radius > 0 {
        content = gaussian_blur(&content, clip.gaussian_blur.radius, clip.gaussian_blur.axis)?;
    }
    if clip.lens_blur.enabled && clip.lens_blur.max_radius > 0 {
        content = lens_blur(
            &content,
            clip.lens_blur.max_radius,
            clip.lens_blur.focus_center,
            clip.lens_blur.focus_width,
        )?;
    }

    let (tw, th) = target.size();
    let center = crate::foundation::core::Canvas {
        width: tw,
        height: th,
    }
    .center();
    let transform = node.transform.to_affine(center) * Affine::translate(local_top_left);
    target.draw_transformed_image(&content, transform, node.opacity, blend);
    Ok(true)
}

/// Drawable pixels for a clip at a source time: procedural cards are
/// synthesized at canvas size, everything else goes through the provider.
/// `None` means "not ready, skip this pass".
fn resolve_source(ctx: &RenderContext<'_>, clip: &Clip, source_time: f64) -> Option<Surface> {
    let canvas = ctx.timeline.canvas;
    match &clip.asset {
        Asset::Solid(a) => Some(procedural::solid_card(canvas, a.color)),
        Asset::Gradient(a) => Some(procedural::gradient_card(canvas, a.top, a.bottom)),
        Asset::Stripe(a) => Some(procedural::stripe_card(canvas, a.a, a.b, a.stripe_width)),
        Asset::Audio(_) => None,
        asset => match ctx.provider.frame(asset, source_time) {
            SourceFrame::Ready(surface) => Some(surface),
            SourceFrame::NotReady => {
                tracing::trace!(clip = clip.id.0, "source not ready, skipping");
                None
            }
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
