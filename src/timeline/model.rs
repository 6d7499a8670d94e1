use crate::{
    animation::track::KeyframeTrack,
    foundation::core::Vec2,
    foundation::error::{StarlitError, StarlitResult},
};

/// Stable identifier of a clip inside a [`crate::Timeline`].
///
/// Cross-clip references (`parent`, `clip_source`) hold a `ClipId` and are
/// resolved by arena lookup, never by pointer, so deleting the referenced
/// clip cannot dangle — lookups simply fail closed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClipId(pub u64);

/// Upper bound on puppet pins per clip (one per marker glyph).
pub const MAX_PINS: usize = 5;

/// Wind-sway band count bounds.
pub const MAX_WIND_DIVISIONS: u32 = 50;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Content referenced by a clip. Closed set; procedural variants
/// (solid/gradient/stripe) are synthesized in-crate, file-backed variants
/// resolve through the [`crate::AssetProvider`] boundary.
pub enum Asset {
    /// Still raster image.
    Image(ImageAsset),
    /// Video file with intrinsic duration and frame rate.
    Video(VideoAsset),
    /// Audio-only file.
    Audio(AudioAsset),
    /// Numbered image sequence played at a fixed rate.
    Sequence(SequenceAsset),
    /// Uniform color card.
    Solid(SolidAsset),
    /// Vertical two-stop gradient card.
    Gradient(GradientAsset),
    /// Alternating vertical stripes card.
    Stripe(StripeAsset),
    /// Nested scene rendered by the host.
    Scene(SceneAsset),
}

impl Asset {
    /// Intrinsic source duration in seconds, for media that has one.
    /// Static content (images, procedural cards) returns `None`.
    pub fn source_duration(&self) -> Option<f64> {
        match self {
            Asset::Video(v) => Some(v.duration),
            Asset::Audio(a) => Some(a.duration),
            Asset::Sequence(s) => {
                if s.fps > 0.0 {
                    Some(f64::from(s.frame_count) / s.fps)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// True for variants that can loop when the clip outlives the source.
    pub fn is_loopable(&self) -> bool {
        matches!(self, Asset::Video(_) | Asset::Sequence(_))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Still-image asset configuration.
pub struct ImageAsset {
    /// Opaque source key resolved by the asset provider.
    pub source: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Video asset configuration.
pub struct VideoAsset {
    /// Opaque source key resolved by the asset provider.
    pub source: String,
    /// Intrinsic duration in seconds.
    pub duration: f64,
    /// Intrinsic frame rate.
    pub fps: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Audio asset configuration.
pub struct AudioAsset {
    /// Opaque source key resolved by the asset provider.
    pub source: String,
    /// Intrinsic duration in seconds.
    pub duration: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Image-sequence asset configuration.
pub struct SequenceAsset {
    /// Opaque source key prefix resolved by the asset provider.
    pub source: String,
    /// Total frame count.
    pub frame_count: u32,
    /// Playback rate in frames per second.
    pub fps: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Solid color card, straight RGBA.
pub struct SolidAsset {
    pub color: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Vertical gradient card, straight RGBA stops.
pub struct GradientAsset {
    pub top: [u8; 4],
    pub bottom: [u8; 4],
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Alternating vertical stripes card, straight RGBA.
pub struct StripeAsset {
    pub a: [u8; 4],
    pub b: [u8; 4],
    /// Stripe width in pixels (`> 0`).
    pub stripe_width: u32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Reference to another scene composited by the host application.
pub struct SceneAsset {
    /// Scene identifier resolved by the asset provider.
    pub scene: String,
}

/// Compositing blend mode applied when a clip is drawn onto the frame.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum BlendMode {
    /// Source-over (premultiplied alpha).
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

/// Edge transition behavior.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum TransitionKind {
    /// No transition; progress is always 1.
    #[default]
    None,
    /// Opacity ramp over the transition window.
    Fade,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Transition attached to a clip edge.
pub struct TransitionSpec {
    pub kind: TransitionKind,
    /// Window length in seconds.
    pub duration: f64,
}

impl TransitionSpec {
    /// Whether this spec actually ramps anything.
    pub fn is_active(&self) -> bool {
        self.kind != TransitionKind::None && self.duration > 0.0
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Animated per-clip properties. Each field is an independent keyframe
/// track; an empty track falls back to the property default (0 for
/// offsets/rotation/pan, 1 for opacity/scale).
pub struct ClipProps {
    #[serde(default = "zero_track")]
    pub x: KeyframeTrack<f64>,
    #[serde(default = "zero_track")]
    pub y: KeyframeTrack<f64>,
    #[serde(default = "zero_track")]
    pub rotation: KeyframeTrack<f64>,
    #[serde(default = "one_track")]
    pub opacity: KeyframeTrack<f64>,
    #[serde(default = "one_track")]
    pub scale: KeyframeTrack<f64>,
    #[serde(default = "zero_track")]
    pub pan: KeyframeTrack<f64>,
}

impl Default for ClipProps {
    fn default() -> Self {
        Self {
            x: zero_track(),
            y: zero_track(),
            rotation: zero_track(),
            opacity: one_track(),
            scale: one_track(),
            pan: zero_track(),
        }
    }
}

fn zero_track() -> KeyframeTrack<f64> {
    KeyframeTrack::single(0.0)
}

fn one_track() -> KeyframeTrack<f64> {
    KeyframeTrack::single(1.0)
}

fn default_anchor() -> Vec2 {
    Vec2::new(0.5, 0.5)
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A timed placement of an [`Asset`] on a track.
pub struct Clip {
    /// Identifier, stable within a timeline.
    pub id: ClipId,
    /// Content reference.
    pub asset: Asset,
    /// Track lane; track 0 composites on top, higher numbers behind.
    pub track: u32,
    /// Timeline start in seconds.
    pub start_time: f64,
    /// Timeline length in seconds.
    pub duration: f64,
    /// Trim-in amount into the source, in seconds.
    #[serde(default)]
    pub offset: f64,
    /// Wrap source time when the clip outlives a loopable source.
    #[serde(default)]
    pub loop_enabled: bool,
    /// Animated transform/opacity/pan properties.
    #[serde(default)]
    pub props: ClipProps,
    /// Anchor point in unit range relative to the undeformed content.
    #[serde(default = "default_anchor")]
    pub anchor: Vec2,
    /// Blend mode used when drawing onto the frame.
    #[serde(default)]
    pub blend: BlendMode,
    /// Parent clip whose world transform this clip inherits. Weak
    /// back-reference; never forms a cycle (enforced at assignment).
    #[serde(default)]
    pub parent: Option<ClipId>,
    /// Clip whose opaque pixels mask this clip. Must sit on a strictly
    /// lower track index (enforced at assignment).
    #[serde(default)]
    pub clip_source: Option<ClipId>,
    /// Opacity ramp at the clip start.
    #[serde(default)]
    pub transition_in: Option<TransitionSpec>,
    /// Opacity ramp at the clip end.
    #[serde(default)]
    pub transition_out: Option<TransitionSpec>,
    /// Wind-sway mesh deformation parameters.
    #[serde(default)]
    pub wind: WindSwayConfig,
    /// Gaussian blur parameters.
    #[serde(default)]
    pub gaussian_blur: GaussianBlurConfig,
    /// Lens (depth-of-field) blur parameters.
    #[serde(default)]
    pub lens_blur: LensBlurConfig,
    /// Puppet-pin mesh deformation parameters.
    #[serde(default)]
    pub puppet: PuppetConfig,
}

impl Clip {
    /// Build a clip with default properties.
    pub fn new(id: ClipId, asset: Asset, track: u32, start_time: f64, duration: f64) -> Self {
        Self {
            id,
            asset,
            track,
            start_time,
            duration,
            offset: 0.0,
            loop_enabled: false,
            props: ClipProps::default(),
            anchor: default_anchor(),
            blend: BlendMode::Normal,
            parent: None,
            clip_source: None,
            transition_in: None,
            transition_out: None,
            wind: WindSwayConfig::default(),
            gaussian_blur: GaussianBlurConfig::default(),
            lens_blur: LensBlurConfig::default(),
            puppet: PuppetConfig::default(),
        }
    }

    /// `[start, start + duration)` containment test.
    pub fn is_active_at(&self, t: f64) -> bool {
        t >= self.start_time && t < self.start_time + self.duration
    }

    /// Validate per-clip invariants (track ordering of keys, pin count,
    /// effect parameter sanity).
    pub fn validate(&self) -> StarlitResult<()> {
        if !self.start_time.is_finite() || !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(StarlitError::validation(format!(
                "clip {:?} must have finite start and duration > 0",
                self.id
            )));
        }
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(StarlitError::validation(format!(
                "clip {:?} offset must be finite and >= 0",
                self.id
            )));
        }
        if !(0.0..=1.0).contains(&self.anchor.x) || !(0.0..=1.0).contains(&self.anchor.y) {
            return Err(StarlitError::validation(format!(
                "clip {:?} anchor must be in unit range",
                self.id
            )));
        }
        for track in [
            &self.props.x,
            &self.props.y,
            &self.props.rotation,
            &self.props.opacity,
            &self.props.scale,
            &self.props.pan,
        ] {
            track.validate()?;
        }
        for spec in [&self.transition_in, &self.transition_out].into_iter().flatten() {
            if !spec.duration.is_finite() || spec.duration < 0.0 {
                return Err(StarlitError::validation(format!(
                    "clip {:?} transition duration must be finite and >= 0",
                    self.id
                )));
            }
        }
        self.wind.validate()?;
        self.gaussian_blur.validate()?;
        self.lens_blur.validate()?;
        self.puppet.validate()?;
        Ok(())
    }
}

/// Axis restriction for the gaussian blur pass.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum BlurAxis {
    #[default]
    Both,
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Gaussian blur effect parameters.
pub struct GaussianBlurConfig {
    pub enabled: bool,
    /// Kernel radius in pixels.
    pub radius: u32,
    /// Axis restriction.
    #[serde(default)]
    pub axis: BlurAxis,
}

impl Default for GaussianBlurConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 8,
            axis: BlurAxis::Both,
        }
    }
}

impl GaussianBlurConfig {
    fn validate(&self) -> StarlitResult<()> {
        if self.radius > 256 {
            return Err(StarlitError::validation(
                "gaussian blur radius must be <= 256",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Lens blur (depth-of-field) effect parameters. Rows inside the focus
/// band stay sharp; blur radius grows with vertical distance from it.
pub struct LensBlurConfig {
    pub enabled: bool,
    /// Largest sampling radius in pixels.
    pub max_radius: u32,
    /// Focus band center as a fraction of image height.
    pub focus_center: f64,
    /// Focus band height as a fraction of image height.
    pub focus_width: f64,
}

impl Default for LensBlurConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_radius: 12,
            focus_center: 0.5,
            focus_width: 0.25,
        }
    }
}

impl LensBlurConfig {
    fn validate(&self) -> StarlitResult<()> {
        if self.max_radius > 256 {
            return Err(StarlitError::validation("lens blur radius must be <= 256"));
        }
        if !(0.0..=1.0).contains(&self.focus_center) || !(0.0..=1.0).contains(&self.focus_width) {
            return Err(StarlitError::validation(
                "lens blur focus band must be in unit range",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
/// Wind-sway mesh deformation parameters.
///
/// `seed` is fixed at clip creation so randomized swings reproduce
/// identically across re-evaluation and export.
pub struct WindSwayConfig {
    pub enabled: bool,
    /// Maximum sway amplitude in degrees.
    pub angle: f64,
    /// Oscillation period in seconds.
    pub period: f64,
    /// Per-band phase stagger in degrees.
    pub phase_shift: f64,
    /// Constant bias angle in degrees.
    pub center: f64,
    /// Horizontal band count, clamped to `1..=MAX_WIND_DIVISIONS`.
    pub divisions: u32,
    /// Dead-zone length at the fixed end, percent of image height.
    pub top_fixed: f64,
    /// Dead-zone length at the free end, percent of image height.
    pub bottom_fixed: f64,
    /// Swap which end is fixed (fixed end at the bottom).
    pub from_bottom: bool,
    /// Vary amplitude cycle-to-cycle with seeded randomness.
    pub random_swing: bool,
    /// Random pattern selector feeding the seeded sampler.
    pub random_pattern: u32,
    /// Attenuate sway beyond a pivot, simulating a fixed branch point.
    pub axis_mode: bool,
    /// Pivot position along the sway axis, unit range from the fixed end.
    pub axis_position: f64,
    /// Attenuation strength in unit range.
    pub axis_strength: f64,
    /// Falloff span beyond the pivot, unit range (`> 0`).
    pub axis_range: f64,
    /// Random pattern identity, fixed at clip creation.
    pub seed: u64,
}

impl Default for WindSwayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            angle: 10.0,
            period: 4.0,
            phase_shift: 45.0,
            center: 0.0,
            divisions: 12,
            top_fixed: 0.0,
            bottom_fixed: 0.0,
            from_bottom: true,
            random_swing: false,
            random_pattern: 0,
            axis_mode: false,
            axis_position: 0.5,
            axis_strength: 0.8,
            axis_range: 0.25,
            seed: 0,
        }
    }
}

impl WindSwayConfig {
    fn validate(&self) -> StarlitResult<()> {
        for (name, v) in [
            ("angle", self.angle),
            ("period", self.period),
            ("phase_shift", self.phase_shift),
            ("center", self.center),
            ("top_fixed", self.top_fixed),
            ("bottom_fixed", self.bottom_fixed),
        ] {
            if !v.is_finite() {
                return Err(StarlitError::validation(format!(
                    "wind {name} must be finite"
                )));
            }
        }
        if self.period <= 0.0 {
            return Err(StarlitError::validation("wind period must be > 0"));
        }
        if !(0.0..=100.0).contains(&self.top_fixed) || !(0.0..=100.0).contains(&self.bottom_fixed) {
            return Err(StarlitError::validation(
                "wind fixed percentages must be in 0..=100",
            ));
        }
        if self.axis_mode
            && (!(0.0..=1.0).contains(&self.axis_position)
                || !(0.0..=1.0).contains(&self.axis_strength)
                || self.axis_range <= 0.0)
        {
            return Err(StarlitError::validation("wind axis parameters out of range"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A user-placed puppet pin with its own keyframed position track.
pub struct Pin {
    /// Identifier, stable within the owning clip.
    pub id: u64,
    /// Marker glyph slot, `0..MAX_PINS`.
    pub index: u8,
    /// Rest position in unit range relative to the undeformed content,
    /// captured at placement time.
    pub x: f64,
    pub y: f64,
    /// Keyframed current position, unit range.
    pub track: KeyframeTrack<Vec2>,
}

impl Pin {
    /// Build a pin at its rest position with one keyframe at `time = 0`.
    pub fn new(id: u64, index: u8, x: f64, y: f64) -> Self {
        Self {
            id,
            index,
            x,
            y,
            track: KeyframeTrack::single(Vec2::new(x, y)),
        }
    }

    /// Rest position as a vector.
    pub fn rest(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Interpolated position at clip-local `t`, falling back to rest.
    pub fn position_at(&self, t: f64) -> Vec2 {
        self.track.sample(t, &self.rest())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Puppet-pin mesh deformation parameters.
pub struct PuppetConfig {
    pub enabled: bool,
    /// Grid fineness; higher density means a finer mesh.
    pub grid_density: u32,
    /// Propagation stiffness in unit range. Higher values widen the
    /// influence radius and soften falloff (rigid, broad deformation);
    /// lower values localize it (rubbery deformation).
    pub stiffness: f64,
    /// Placed pins, at most [`MAX_PINS`].
    #[serde(default)]
    pub pins: Vec<Pin>,
}

impl Default for PuppetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_density: 10,
            stiffness: 0.5,
            pins: Vec::new(),
        }
    }
}

impl PuppetConfig {
    /// Add a pin if a marker slot is free.
    pub fn add_pin(&mut self, pin: Pin) -> StarlitResult<()> {
        if self.pins.len() >= MAX_PINS {
            return Err(StarlitError::validation(format!(
                "at most {MAX_PINS} puppet pins per clip"
            )));
        }
        if usize::from(pin.index) >= MAX_PINS {
            return Err(StarlitError::validation(format!(
                "pin index must be < {MAX_PINS}"
            )));
        }
        self.pins.push(pin);
        Ok(())
    }

    /// Remove a pin by id. Returns whether one was removed.
    pub fn remove_pin(&mut self, id: u64) -> bool {
        let before = self.pins.len();
        self.pins.retain(|p| p.id != id);
        self.pins.len() != before
    }

    fn validate(&self) -> StarlitResult<()> {
        if self.pins.len() > MAX_PINS {
            return Err(StarlitError::validation(format!(
                "at most {MAX_PINS} puppet pins per clip"
            )));
        }
        if !(0.0..=1.0).contains(&self.stiffness) {
            return Err(StarlitError::validation(
                "puppet stiffness must be in unit range",
            ));
        }
        for pin in &self.pins {
            if usize::from(pin.index) >= MAX_PINS {
                return Err(StarlitError::validation(format!(
                    "pin index must be < {MAX_PINS}"
                )));
            }
            pin.track.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
