use crate::{
    eval::transform::resolve_world_transform,
    foundation::core::WorldTransform,
    foundation::error::{StarlitError, StarlitResult},
    timeline::model::{BlendMode, Clip, ClipId},
    timeline::project::Timeline,
};

#[derive(Clone, Debug, serde::Serialize)]
/// One active clip, fully resolved for a single query time.
///
/// This is a pure data stage: the compositor consumes it to draw pixels,
/// the host's audio mixer reads `pan`/`audio_gain`, and tests assert on
/// it without touching any raster state.
pub struct EvaluatedClip {
    /// Source clip id.
    pub clip_id: ClipId,
    /// Track lane (kept for draw ordering; lower index draws later/on top).
    pub track: u32,
    /// Clip-local time in seconds (`query_time - start_time`).
    pub local_time: f64,
    /// Time to sample the underlying source at, after trim-in and loop
    /// wrapping.
    pub source_time: f64,
    /// Composed world transform (§ parent chain).
    pub transform: WorldTransform,
    /// Keyframed opacity multiplied by transition progress, in `[0, 1]`.
    pub opacity: f64,
    /// Edge transition progress in `[0, 1]`; 1 outside any window.
    pub transition_progress: f64,
    /// Stereo pan in `[-1, 1]` for the external mixer.
    pub pan: f64,
    /// Gain factor the external mixer applies (edge fades only).
    pub audio_gain: f64,
    /// Blend mode used when drawing onto the frame.
    pub blend: BlendMode,
}

/// Stateless evaluator from timeline state to the per-frame active set.
pub struct Evaluator;

impl Evaluator {
    /// Resolve every clip active at `t`, ordered back-to-front: highest
    /// track index first, so track 0 draws last and wins on top.
    #[tracing::instrument(skip(timeline))]
    pub fn evaluate_frame(timeline: &Timeline, t: f64) -> StarlitResult<Vec<EvaluatedClip>> {
        if !t.is_finite() || t < 0.0 {
            return Err(StarlitError::evaluation("query time must be finite and >= 0"));
        }

        let mut out: Vec<EvaluatedClip> = timeline
            .clips
            .values()
            .filter(|clip| clip.is_active_at(t))
            .map(|clip| Self::evaluate_clip(timeline, clip, t))
            .collect();

        out.sort_by(|a, b| {
            b.track
                .cmp(&a.track)
                .then_with(|| a.local_time.total_cmp(&b.local_time).reverse())
                .then_with(|| a.clip_id.cmp(&b.clip_id))
        });
        Ok(out)
    }

    /// Resolve one clip at timeline time `t` (caller guarantees activity).
    pub fn evaluate_clip(timeline: &Timeline, clip: &Clip, t: f64) -> EvaluatedClip {
        let local_time = t - clip.start_time;
        let source_time = source_time_for(clip, local_time);
        let transition_progress = transition_progress(clip, local_time);
        let keyed_opacity = clip.props.opacity.sample(local_time, &1.0).clamp(0.0, 1.0);

        EvaluatedClip {
            clip_id: clip.id,
            track: clip.track,
            local_time,
            source_time,
            transform: resolve_world_transform(timeline, clip, local_time),
            opacity: (keyed_opacity * transition_progress).clamp(0.0, 1.0),
            transition_progress,
            pan: clip.props.pan.sample(local_time, &0.0).clamp(-1.0, 1.0),
            audio_gain: transition_progress,
            blend: clip.blend,
        }
    }
}

/// Map clip-local time onto source time, applying trim-in and — for
/// looping media — wrapping modulo the trimmed source length.
fn source_time_for(clip: &Clip, local_time: f64) -> f64 {
    let local = local_time.max(0.0);
    if clip.loop_enabled
        && clip.asset.is_loopable()
        && let Some(source_duration) = clip.asset.source_duration()
    {
        let span = source_duration - clip.offset;
        if span > 0.0 {
            return clip.offset + local.rem_euclid(span);
        }
    }
    clip.offset + local
}

/// Edge transition progress at clip-local `t`.
///
/// The out window is checked after the in window, so on a clip shorter
/// than both windows the out ramp takes over, matching how overlapping
/// edges resolve in the editor.
fn transition_progress(clip: &Clip, local_time: f64) -> f64 {
    let mut progress = 1.0;

    if let Some(spec) = &clip.transition_in
        && spec.is_active()
        && local_time < spec.duration
    {
        progress = (local_time / spec.duration).clamp(0.0, 1.0);
    }

    if let Some(spec) = &clip.transition_out
        && spec.is_active()
    {
        let remaining = clip.duration - local_time;
        if remaining < spec.duration {
            progress = (remaining / spec.duration).clamp(0.0, 1.0);
        }
    }

    progress
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
