use crate::{
    foundation::core::{Vec2, WorldTransform},
    timeline::model::Clip,
    timeline::project::Timeline,
};

/// A clip's own transform at clip-local `t`, before parent composition.
pub fn local_transform(clip: &Clip, local_time: f64) -> WorldTransform {
    WorldTransform {
        x: clip.props.x.sample(local_time, &0.0),
        y: clip.props.y.sample(local_time, &0.0),
        rotation: clip.props.rotation.sample(local_time, &0.0),
        scale: clip.props.scale.sample(local_time, &1.0),
    }
}

/// Resolve a clip's world transform at clip-local `t` by composing its
/// local transform with the full ancestor chain.
///
/// The parent is evaluated at its own local time
/// (`local_time + clip.start_time - parent.start_time`), then the child's
/// local offset is rotated by the parent's world rotation and scaled by
/// the parent's world scale before translation. Scale multiplies and
/// rotation adds down the chain.
///
/// No caching: every ancestor's tracks are time-varying, so the chain is
/// re-walked per query. A dangling parent id resolves as "no parent".
/// Acyclicity is an invariant owned by [`Timeline::set_parent`] and
/// [`Timeline::validate`]; this walk relies on it to terminate.
pub fn resolve_world_transform(timeline: &Timeline, clip: &Clip, local_time: f64) -> WorldTransform {
    let local = local_transform(clip, local_time);
    let Some(parent) = clip.parent.and_then(|id| timeline.clip(id)) else {
        return local;
    };

    let parent_local_time = local_time + clip.start_time - parent.start_time;
    let pw = resolve_world_transform(timeline, parent, parent_local_time);

    let theta = pw.rotation.to_radians();
    let (sin, cos) = theta.sin_cos();
    WorldTransform {
        x: pw.x + (local.x * cos - local.y * sin) * pw.scale,
        y: pw.y + (local.x * sin + local.y * cos) * pw.scale,
        rotation: pw.rotation + local.rotation,
        scale: pw.scale * local.scale,
    }
}

/// World transform of a clip's parent chain alone (identity when the clip
/// has no live parent). This is the frame manipulation handles need to
/// map screen deltas into local property space.
pub fn parent_world_transform(timeline: &Timeline, clip: &Clip, local_time: f64) -> WorldTransform {
    match clip.parent.and_then(|id| timeline.clip(id)) {
        Some(parent) => {
            let parent_local_time = local_time + clip.start_time - parent.start_time;
            resolve_world_transform(timeline, parent, parent_local_time)
        }
        None => WorldTransform::default(),
    }
}

/// Translate a screen-space drag delta into a delta on the clip's local
/// `x`/`y` tracks, inverting the parent chain's rotation and scale.
///
/// Degenerate parent scale (|scale| ~ 0) yields a zero delta rather than
/// a non-finite one.
pub fn screen_delta_to_local(
    timeline: &Timeline,
    clip: &Clip,
    local_time: f64,
    delta: Vec2,
) -> Vec2 {
    let pw = parent_world_transform(timeline, clip, local_time);
    if pw.scale.abs() < 1e-9 {
        return Vec2::ZERO;
    }
    let theta = pw.rotation.to_radians();
    let (sin, cos) = theta.sin_cos();
    // Inverse of rotate-then-scale: de-rotate, then divide by scale.
    Vec2::new(
        (delta.x * cos + delta.y * sin) / pw.scale,
        (-delta.x * sin + delta.y * cos) / pw.scale,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/eval/transform.rs"]
mod tests;
