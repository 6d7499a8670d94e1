use crate::{
    animation::track::{KeyframeTrack, Lerp},
    foundation::error::StarlitResult,
    render::blur::gaussian_blur,
    render::surface::{RasterSurface, Surface},
    timeline::model::{BlendMode, BlurAxis},
};

/// Full-frame passes applied after clip compositing, in a fixed order:
/// gradient overlays (top then bottom) → letterbox bars → normalize →
/// diffusion → color key.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct PostEffects {
    #[serde(default)]
    pub gradient_top: Option<GradientOverlay>,
    #[serde(default)]
    pub gradient_bottom: Option<GradientOverlay>,
    #[serde(default)]
    pub letterbox: Option<Letterbox>,
    #[serde(default)]
    pub normalize: Option<Normalize>,
    #[serde(default)]
    pub diffusion: Option<Diffusion>,
    #[serde(default)]
    pub color_key: Option<ColorKey>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// A color wash fading in from one frame edge, with its own blend mode.
pub struct GradientOverlay {
    /// Straight RGBA at the frame edge.
    pub color: [u8; 4],
    /// Overlay reach as a fraction of frame height.
    pub height: f64,
    /// Overall opacity in unit range.
    pub opacity: f64,
    /// Blend mode for the wash.
    pub blend: BlendMode,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Opaque bars at the top and bottom of the frame.
pub struct Letterbox {
    /// Bar height as a fraction of frame height (per bar).
    pub height: f64,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Edge-aware smoothing; intensity gates both the blend amount and the
/// pass count (1–3).
pub struct Normalize {
    /// Strength in unit range.
    pub intensity: f64,
}

/// The diffusion pass's animatable parameter 5-tuple. Interpolates with
/// the same linear rule as every other keyframe track.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiffusionParams {
    /// Glow blur radius in pixels.
    pub blur: f64,
    /// Contrast multiplier around mid-gray (1 = unchanged).
    pub contrast: f64,
    /// Brightness multiplier (1 = unchanged).
    pub brightness: f64,
    /// Saturation multiplier (1 = unchanged).
    pub saturation: f64,
    /// Mix of the diffused image over the frame, unit range.
    pub opacity: f64,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            blur: 8.0,
            contrast: 1.1,
            brightness: 1.05,
            saturation: 1.0,
            opacity: 0.35,
        }
    }
}

impl Lerp for DiffusionParams {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            blur: <f64 as Lerp>::lerp(&a.blur, &b.blur, t),
            contrast: <f64 as Lerp>::lerp(&a.contrast, &b.contrast, t),
            brightness: <f64 as Lerp>::lerp(&a.brightness, &b.brightness, t),
            saturation: <f64 as Lerp>::lerp(&a.saturation, &b.saturation, t),
            opacity: <f64 as Lerp>::lerp(&a.opacity, &b.opacity, t),
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Soft-glow pass: blur + color adjust, blended back by opacity. Carries
/// its own keyframe track, independent of any clip.
pub struct Diffusion {
    /// Keyframed parameters; empty track means the defaults throughout.
    #[serde(default)]
    pub track: KeyframeTrack<DiffusionParams>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Chroma-key transparency over the finished frame.
pub struct ColorKey {
    /// Key color, straight RGB.
    pub color: [u8; 3],
    /// Euclidean RGB distance fully keyed out.
    pub tolerance: f64,
    /// Extra distance over which alpha ramps back to opaque.
    pub feather: f64,
    /// Key out everything except the key color instead.
    pub invert: bool,
}

/// Run the configured post effects over the frame, in the fixed order.
#[tracing::instrument(skip(frame, fx))]
pub fn apply_post_effects(frame: &mut Surface, fx: &PostEffects, t: f64) -> StarlitResult<()> {
    if let Some(overlay) = &fx.gradient_top {
        apply_gradient_overlay(frame, overlay, true);
    }
    if let Some(overlay) = &fx.gradient_bottom {
        apply_gradient_overlay(frame, overlay, false);
    }
    if let Some(letterbox) = &fx.letterbox {
        apply_letterbox(frame, letterbox);
    }
    if let Some(normalize) = &fx.normalize {
        apply_normalize(frame, normalize);
    }
    if let Some(diffusion) = &fx.diffusion {
        apply_diffusion(frame, diffusion, t)?;
    }
    if let Some(key) = &fx.color_key {
        apply_color_key(frame, key);
    }
    Ok(())
}

fn apply_gradient_overlay(frame: &mut Surface, overlay: &GradientOverlay, from_top: bool) {
    let h = frame.height();
    let w = frame.width();
    let reach = (overlay.height.clamp(0.0, 1.0) * f64::from(h)).round() as u32;
    if reach == 0 || overlay.opacity <= 0.0 {
        return;
    }

    for row in 0..reach.min(h) {
        let y = if from_top { row } else { h - 1 - row };
        // Full strength at the edge, fading to nothing at the inner end.
        let strength = (1.0 - f64::from(row) / f64::from(reach)) * overlay.opacity.clamp(0.0, 1.0);
        let a = (f64::from(overlay.color[3]) * strength).round().clamp(0.0, 255.0) as u8;
        let px = crate::foundation::core::Rgba8Premul::from_straight_rgba(
            overlay.color[0],
            overlay.color[1],
            overlay.color[2],
            a,
        )
        .to_array();
        for x in 0..w {
            let d = frame.pixel(i64::from(x), i64::from(y));
            frame.put_pixel(
                i64::from(x),
                i64::from(y),
                crate::render::blend::composite_pixel(d, px, overlay.blend),
            );
        }
    }
}

fn apply_letterbox(frame: &mut Surface, letterbox: &Letterbox) {
    let h = frame.height();
    let bar = (letterbox.height.clamp(0.0, 0.5) * f64::from(h)).round() as u32;
    let black = [0, 0, 0, 255];
    for y in 0..bar.min(h) {
        for x in 0..frame.width() {
            frame.put_pixel(i64::from(x), i64::from(y), black);
            frame.put_pixel(i64::from(x), i64::from(h - 1 - y), black);
        }
    }
}

/// Edge-aware 3x3 smoothing: a pixel blends toward the mean of the
/// neighbors whose color is close to its own, so flat regions settle
/// while edges hold. Intensity gates the blend and the pass count (1–3).
fn apply_normalize(frame: &mut Surface, normalize: &Normalize) {
    let intensity = normalize.intensity.clamp(0.0, 1.0);
    if intensity <= 0.0 {
        return;
    }
    let passes = ((intensity * 3.0).ceil() as usize).clamp(1, 3);

    // Neighbor similarity threshold in premultiplied channel units.
    let threshold = 48.0;
    for _ in 0..passes {
        let snapshot = frame.clone();
        let (w, h) = (frame.width() as i64, frame.height() as i64);
        for y in 0..h {
            for x in 0..w {
                let center = snapshot.pixel(x, y);
                let mut acc = [0.0f64; 4];
                let mut count = 0.0;
                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        let n = snapshot.pixel(x + dx, y + dy);
                        let dist = (0..3)
                            .map(|c| (f64::from(n[c]) - f64::from(center[c])).powi(2))
                            .sum::<f64>()
                            .sqrt();
                        if dist <= threshold {
                            for c in 0..4 {
                                acc[c] += f64::from(n[c]);
                            }
                            count += 1.0;
                        }
                    }
                }
                if count > 0.0 {
                    let mut out = [0u8; 4];
                    for c in 0..4 {
                        let mean = acc[c] / count;
                        let blended =
                            f64::from(center[c]) * (1.0 - intensity) + mean * intensity;
                        out[c] = blended.round().clamp(0.0, 255.0) as u8;
                    }
                    frame.put_pixel(x, y, out);
                }
            }
        }
    }
}

fn apply_diffusion(frame: &mut Surface, diffusion: &Diffusion, t: f64) -> StarlitResult<()> {
    let params = diffusion.track.sample(t, &DiffusionParams::default());
    let opacity = params.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    let radius = params.blur.max(0.0).round() as u32;
    let mut glow = gaussian_blur(frame, radius, BlurAxis::Both)?;
    adjust_colors(&mut glow, params.contrast, params.brightness, params.saturation);
    frame.composite_with_blend_mode(&glow, opacity, BlendMode::Normal);
    Ok(())
}

/// Contrast/brightness/saturation adjustment on straight colors.
fn adjust_colors(surface: &mut Surface, contrast: f64, brightness: f64, saturation: f64) {
    for px in surface.data_mut().chunks_exact_mut(4) {
        let a = f64::from(px[3]);
        if a == 0.0 {
            continue;
        }
        let mut straight = [0.0f64; 3];
        for c in 0..3 {
            straight[c] = f64::from(px[c]) / a * 255.0;
        }

        for v in &mut straight {
            *v = ((*v - 127.5) * contrast + 127.5) * brightness;
        }

        let gray = 0.3 * straight[0] + 0.59 * straight[1] + 0.11 * straight[2];
        for v in &mut straight {
            *v = gray + (*v - gray) * saturation;
        }

        for c in 0..3 {
            let clamped = straight[c].clamp(0.0, 255.0);
            px[c] = (clamped * a / 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Euclidean RGB-distance chroma key producing per-pixel alpha: inside
/// tolerance keys out fully, the feather band ramps back to opaque, and
/// `invert` keeps only the key color instead.
fn apply_color_key(frame: &mut Surface, key: &ColorKey) {
    let tolerance = key.tolerance.max(0.0);
    let feather = key.feather.max(0.0);

    for px in frame.data_mut().chunks_exact_mut(4) {
        let a = f64::from(px[3]);
        if a == 0.0 {
            continue;
        }
        let dist = (0..3)
            .map(|c| {
                let straight = f64::from(px[c]) / a * 255.0;
                (straight - f64::from(key.color[c])).powi(2)
            })
            .sum::<f64>()
            .sqrt();

        // keep = fraction of the pixel that survives the key.
        let mut keep = if dist <= tolerance {
            0.0
        } else if dist <= tolerance + feather && feather > 0.0 {
            (dist - tolerance) / feather
        } else {
            1.0
        };
        if key.invert {
            keep = 1.0 - keep;
        }

        if keep < 1.0 {
            for c in px.iter_mut() {
                *c = (f64::from(*c) * keep).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/post.rs"]
mod tests;
