use crate::foundation::error::{StarlitError, StarlitResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Canvas center in pixel coordinates.
    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Rational frame rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> StarlitResult<Self> {
        if num == 0 || den == 0 {
            return Err(StarlitError::validation("Fps num and den must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_interval(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// World-space transform of a clip after composing its parent chain.
///
/// Derived per query, never stored: every ancestor's keyframe tracks are
/// time-varying, so the chain is re-walked on each evaluation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorldTransform {
    /// Horizontal offset from canvas center, in pixels.
    pub x: f64,
    /// Vertical offset from canvas center, in pixels.
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl WorldTransform {
    /// Affine placing local pixel coordinates onto a canvas: translate to
    /// canvas center plus world offset, then rotate, then scale.
    pub fn to_affine(self, center: Vec2) -> Affine {
        Affine::translate(Vec2::new(center.x + self.x, center.y + self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale(self.scale)
    }
}
