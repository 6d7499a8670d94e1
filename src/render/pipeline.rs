use crate::{
    foundation::core::Fps,
    foundation::error::{StarlitError, StarlitResult},
    render::compositor::{Compositor, RenderContext},
    render::surface::Surface,
};

/// Totals reported by a deterministic export run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames rendered and delivered to the sink.
    pub frames: u64,
}

/// Deterministic frame-by-frame export driver.
///
/// Iterates `t` over `[range_start, range_end)` at `1/fps` steps and
/// hands every composited frame to `sink` in order, awaiting each full
/// pass synchronously — no frame is dropped or duplicated regardless of
/// host performance, and no debouncing applies. Encoders live behind the
/// sink and need no knowledge of compositing internals.
#[tracing::instrument(skip(ctx, sink))]
pub fn render_range(
    ctx: &RenderContext<'_>,
    range_start: f64,
    range_end: f64,
    fps: Fps,
    mut sink: impl FnMut(u64, Surface) -> StarlitResult<()>,
) -> StarlitResult<RenderStats> {
    if !range_start.is_finite() || !range_end.is_finite() || range_end < range_start {
        return Err(StarlitError::validation(
            "export range must be finite with end >= start",
        ));
    }

    let step = fps.frame_interval();
    let total = ((range_end - range_start) / step).ceil().max(0.0) as u64;

    let mut stats = RenderStats::default();
    for index in 0..total {
        let t = range_start + (index as f64) * step;
        if t >= range_end {
            break;
        }
        let frame = Compositor::render_frame_at(ctx, t)?;
        sink(index, frame)?;
        stats.frames += 1;
    }

    tracing::debug!(frames = stats.frames, "export range complete");
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
