use std::collections::BTreeMap;

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{StarlitError, StarlitResult},
    timeline::model::{Asset, Clip, ClipId},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// The complete editable timeline: canvas geometry, frame rate, and the
/// clip arena.
///
/// A timeline is a pure data model: it can be built programmatically,
/// serialized to JSON via Serde (asset references stay opaque keys, clip
/// cross-references stay numeric ids), and handed to
/// [`crate::Compositor`] together with an asset provider to produce
/// pixels.
pub struct Timeline {
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Timeline frame rate, used by export drivers for stepping.
    pub fps: Fps,
    /// Clip arena keyed by stable id.
    pub clips: BTreeMap<ClipId, Clip>,
    /// Next id handed out by [`Timeline::add_clip`].
    #[serde(default)]
    next_id: u64,
}

impl Timeline {
    /// Empty timeline with the given output geometry.
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self {
            canvas,
            fps,
            clips: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Place an asset on the timeline and return the new clip's id.
    pub fn add_clip(&mut self, asset: Asset, track: u32, start_time: f64, duration: f64) -> ClipId {
        let id = ClipId(self.next_id);
        self.next_id += 1;
        self.clips.insert(id, Clip::new(id, asset, track, start_time, duration));
        id
    }

    /// Remove a clip. References other clips hold to it (parent or mask)
    /// are left in place and fail closed at resolution time.
    pub fn remove_clip(&mut self, id: ClipId) -> Option<Clip> {
        self.clips.remove(&id)
    }

    /// Look up a clip.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    /// Look up a clip mutably.
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.get_mut(&id)
    }

    /// End of the last clip, in seconds. Zero for an empty timeline.
    pub fn duration(&self) -> f64 {
        self.clips
            .values()
            .map(|c| c.start_time + c.duration)
            .fold(0.0, f64::max)
    }

    /// True when `ancestor` appears anywhere in `id`'s parent chain.
    ///
    /// Dangling parent references terminate the walk (fail closed), so
    /// the traversal is finite on any timeline this type can construct.
    pub fn is_ancestor_of(&self, ancestor: ClipId, id: ClipId) -> bool {
        let mut cursor = self.clips.get(&id).and_then(|c| c.parent);
        // Bounded by arena size; acyclicity is an invariant of set_parent.
        let mut remaining = self.clips.len();
        while let Some(p) = cursor {
            if p == ancestor {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            cursor = self.clips.get(&p).and_then(|c| c.parent);
        }
        false
    }

    /// Assign or clear a clip's parent.
    ///
    /// Rejected (state untouched) when the assignment would create a
    /// cycle — including self-parenting — or when either clip is unknown.
    pub fn set_parent(&mut self, id: ClipId, parent: Option<ClipId>) -> StarlitResult<()> {
        if !self.clips.contains_key(&id) {
            return Err(StarlitError::validation(format!("unknown clip {id:?}")));
        }
        if let Some(p) = parent {
            if p == id {
                return Err(StarlitError::validation("a clip cannot parent itself"));
            }
            if !self.clips.contains_key(&p) {
                return Err(StarlitError::validation(format!("unknown parent clip {p:?}")));
            }
            if self.is_ancestor_of(id, p) {
                return Err(StarlitError::validation(
                    "parent assignment would create a cycle",
                ));
            }
        }
        if let Some(clip) = self.clips.get_mut(&id) {
            clip.parent = parent;
        }
        Ok(())
    }

    /// Assign or clear a clip's mask source.
    ///
    /// The source must sit on a strictly lower track index (drawn above
    /// the masked clip), and may not be the clip itself.
    pub fn set_clip_source(&mut self, id: ClipId, source: Option<ClipId>) -> StarlitResult<()> {
        let Some(clip_track) = self.clips.get(&id).map(|c| c.track) else {
            return Err(StarlitError::validation(format!("unknown clip {id:?}")));
        };
        if let Some(s) = source {
            if s == id {
                return Err(StarlitError::validation("a clip cannot mask itself"));
            }
            let Some(source_track) = self.clips.get(&s).map(|c| c.track) else {
                return Err(StarlitError::validation(format!("unknown mask clip {s:?}")));
            };
            if source_track >= clip_track {
                return Err(StarlitError::validation(
                    "mask source must sit on a strictly lower track",
                ));
            }
        }
        if let Some(clip) = self.clips.get_mut(&id) {
            clip.clip_source = source;
        }
        Ok(())
    }

    /// Validate timeline invariants and every clip.
    pub fn validate(&self) -> StarlitResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(StarlitError::validation("canvas width/height must be > 0"));
        }
        for clip in self.clips.values() {
            clip.validate()?;
            if clip.parent == Some(clip.id) {
                return Err(StarlitError::validation(format!(
                    "clip {:?} parents itself",
                    clip.id
                )));
            }
            if let Some(src) = clip.clip_source
                && let Some(source) = self.clips.get(&src)
                && source.track >= clip.track
            {
                return Err(StarlitError::validation(format!(
                    "clip {:?} mask source must sit on a strictly lower track",
                    clip.id
                )));
            }
        }
        // Parent chains must be acyclic even if a document was edited by
        // hand: a chain longer than the arena implies a cycle.
        for clip in self.clips.values() {
            let mut cursor = clip.parent;
            let mut remaining = self.clips.len();
            while let Some(p) = cursor {
                if remaining == 0 {
                    return Err(StarlitError::validation(format!(
                        "clip {:?} has a cyclic parent chain",
                        clip.id
                    )));
                }
                remaining -= 1;
                cursor = self.clips.get(&p).and_then(|c| c.parent);
            }
        }
        Ok(())
    }

    /// Deserialize a timeline document, backfilling the id counter so
    /// later [`Timeline::add_clip`] calls never collide with loaded ids.
    pub fn from_json(json: &str) -> StarlitResult<Self> {
        let mut timeline: Timeline = serde_json::from_str(json)
            .map_err(|e| StarlitError::serde(format!("timeline parse failed: {e}")))?;
        let max_id = timeline.clips.keys().map(|id| id.0).max().unwrap_or(0);
        timeline.next_id = timeline.next_id.max(max_id + 1);
        timeline.validate()?;
        Ok(timeline)
    }

    /// Serialize to the JSON-compatible nested-record form.
    pub fn to_json(&self) -> StarlitResult<String> {
        serde_json::to_string(self)
            .map_err(|e| StarlitError::serde(format!("timeline serialize failed: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/project.rs"]
mod tests;
