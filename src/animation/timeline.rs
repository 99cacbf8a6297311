use crate::animation::AnimationTarget;
use crate::animation::clip::Clip;
use crate::errors::{Result, TesseraError};
use crate::scene::ShapeKey;

/// Every clip of an animation on one time axis.
///
/// Clips on the same target may touch but never overlap: a clip whose start
/// or end falls strictly inside another clip's span on that target is
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    clips: Vec<Clip>,
    length: f32,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clip(&mut self, clip: Clip) -> Result<()> {
        let (start, end) = (clip.start, clip.end());
        let inside = |t: f32, other: &Clip| t > other.start && t < other.end();
        if let Some(other) = self
            .clips
            .iter()
            .filter(|c| c.target == clip.target)
            .find(|c| inside(start, c) || inside(end, c))
        {
            log::warn!("clip `{}` overlaps `{}` on the same shape", clip.id, other.id);
            return Err(TesseraError::AnimationConflict {
                clip: clip.id,
                start,
                end,
            });
        }
        self.length = self.length.max(end);
        self.clips.push(clip);
        Ok(())
    }

    /// Adds all clips or none.
    pub fn add_clips(&mut self, clips: impl IntoIterator<Item = Clip>) -> Result<()> {
        let snapshot = (self.clips.len(), self.length);
        for clip in clips {
            if let Err(e) = self.add_clip(clip) {
                self.clips.truncate(snapshot.0);
                self.length = snapshot.1;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Drops the clips of one motion. Returns how many were removed.
    pub fn remove_motion(&mut self, motion_id: &str) -> usize {
        let before = self.clips.len();
        self.clips.retain(|c| c.motion_id != motion_id);
        self.length = self.clips.iter().map(Clip::end).fold(0.0, f32::max);
        before - self.clips.len()
    }

    /// Milliseconds until the last clip ends.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[must_use]
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Distinct targets, in first-clip order.
    #[must_use]
    pub fn targets(&self) -> Vec<ShapeKey> {
        let mut targets = Vec::new();
        for clip in &self.clips {
            if !targets.contains(&clip.target) {
                targets.push(clip.target);
            }
        }
        targets
    }

    /// Applies every clip at `ms`, in insertion order. At or past the end the
    /// timeline finishes instead. Returns `true` when it finished.
    pub fn apply_at<T: AnimationTarget + ?Sized>(&mut self, ms: f32, targets: &mut T) -> bool {
        if ms >= self.length {
            self.finish(targets);
            return true;
        }
        for clip in &mut self.clips {
            clip.apply_at(ms, targets);
        }
        false
    }

    pub fn reset<T: AnimationTarget + ?Sized>(&mut self, targets: &mut T) {
        for clip in &mut self.clips {
            clip.reset(targets);
        }
    }

    pub fn finish<T: AnimationTarget + ?Sized>(&mut self, targets: &mut T) {
        for clip in &mut self.clips {
            clip.finish(targets);
        }
    }

    pub fn clear(&mut self) {
        self.clips.clear();
        self.length = 0.0;
    }
}
