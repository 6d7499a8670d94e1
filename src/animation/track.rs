use crate::foundation::core::Vec2;
use crate::foundation::error::{StarlitError, StarlitResult};

/// Merge tolerance for programmatic "live" property edits, in seconds.
pub const EPSILON_LIVE: f64 = 0.01;

/// Merge tolerance for manual timeline drags, in seconds.
pub const EPSILON_DRAG: f64 = 0.05;

/// Interpolation contract for keyframeable value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// One `(time, value)` sample on a keyframe track.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Key<T> {
    /// Clip-local time in seconds (`>= 0`).
    pub time: f64,
    /// Value at `time`.
    pub value: T,
}

/// A sortable list of `(time, value)` samples for one animatable property.
///
/// Values between samples are linearly interpolated; queries outside the
/// sampled range clamp to the boundary sample (no extrapolation). The key
/// list is kept time-ascending across every mutation.
#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct KeyframeTrack<T> {
    /// Samples sorted ascending by `time`.
    pub keys: Vec<Key<T>>,
}

impl<T> KeyframeTrack<T>
where
    T: Lerp + Clone,
{
    /// Track with no samples; [`KeyframeTrack::sample`] returns the
    /// caller-supplied default.
    pub fn empty() -> Self {
        Self { keys: Vec::new() }
    }

    /// Track with one sample at `time = 0`, the state every fresh clip
    /// property starts in.
    pub fn single(value: T) -> Self {
        Self {
            keys: vec![Key { time: 0.0, value }],
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the track holds no samples.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validate ordering and finiteness of sample times.
    pub fn validate(&self) -> StarlitResult<()> {
        for k in &self.keys {
            if !k.time.is_finite() || k.time < 0.0 {
                return Err(StarlitError::animation(
                    "keyframe time must be finite and >= 0",
                ));
            }
        }
        if !self.keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(StarlitError::animation(
                "keyframe track must be sorted by time",
            ));
        }
        Ok(())
    }

    /// Interpolated value at `t`, falling back to `default` when empty.
    pub fn sample(&self, t: f64, default: &T) -> T {
        if self.keys.is_empty() {
            return default.clone();
        }

        let idx = self.keys.partition_point(|k| k.time <= t);
        if idx == 0 {
            return self.keys[0].value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.time - a.time;
        if denom <= 0.0 {
            return a.value.clone();
        }
        let u = (t - a.time) / denom;
        T::lerp(&a.value, &b.value, u)
    }

    /// Set the value at `t`: overwrite an existing sample within
    /// `epsilon`, otherwise insert a new one and re-sort.
    ///
    /// This is how "set value at current playhead" authoring works; it is
    /// implicit keyframing rather than explicit add/remove.
    pub fn upsert(&mut self, t: f64, value: T, epsilon: f64) {
        if let Some(k) = self
            .keys
            .iter_mut()
            .find(|k| (k.time - t).abs() <= epsilon)
        {
            k.value = value;
            return;
        }
        self.keys.push(Key { time: t, value });
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Remove the sample within `epsilon` of `t` if one exists, otherwise
    /// insert one at `current`. Backs the keyframe toggle button.
    pub fn toggle(&mut self, t: f64, current: T, epsilon: f64) {
        if !self.remove_near(t, epsilon) {
            self.upsert(t, current, epsilon);
        }
    }

    /// Remove the sample within `epsilon` of `t`. Returns whether one was
    /// removed. Removal may leave the track empty; sampling then falls
    /// back to the property default.
    pub fn remove_near(&mut self, t: f64, epsilon: f64) -> bool {
        let before = self.keys.len();
        // Only the nearest match goes, in case several sit inside epsilon.
        if let Some((idx, _)) = self
            .keys
            .iter()
            .enumerate()
            .filter(|(_, k)| (k.time - t).abs() <= epsilon)
            .min_by(|(_, a), (_, b)| (a.time - t).abs().total_cmp(&(b.time - t).abs()))
        {
            self.keys.remove(idx);
        }
        self.keys.len() != before
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/track.rs"]
mod tests;
