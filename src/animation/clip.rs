use glam::{Quat, Vec3};

use crate::animation::AnimationTarget;
use crate::animation::easing::expo_ease_out;
use crate::scene::ShapeKey;
use crate::scene::transform::Overlay;

/// Where a clip ends up, relative to the target's base transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub translate: Vec3,
    /// Absolute position; replaces `translate` with the offset from the
    /// target's position when the clip is applied.
    pub move_to: Option<Vec3>,
    /// Scale ratios minus one, so that zero means "unchanged".
    pub scale_delta: Vec3,
    pub rotate_rad: f32,
    pub rotate_axis: Vec3,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            translate: Vec3::ZERO,
            move_to: None,
            scale_delta: Vec3::ZERO,
            rotate_rad: 0.0,
            rotate_axis: Vec3::Z,
        }
    }
}

/// One timed movement of one shape.
///
/// A clip owns an overlay on its target's transform, keyed by the clip id.
/// Before `start` it does nothing; between `start` and `start + length` the
/// overlay follows an expo-ease-out curve; at the end the full destination
/// is applied and the clip is finished until [`Clip::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub id: String,
    pub motion_id: String,
    pub target: ShapeKey,
    /// Milliseconds from the start of the timeline.
    pub start: f32,
    /// Milliseconds; zero finishes on the first application.
    pub length: f32,
    pub destination: Destination,
    finished: bool,
}

impl Clip {
    #[must_use]
    pub fn new(target: ShapeKey, start: f32, motion_id: impl Into<String>) -> Self {
        Self {
            id: format!("clip-{}", uuid::Uuid::new_v4()),
            motion_id: motion_id.into(),
            target,
            start,
            length: 0.0,
            destination: Destination::default(),
            finished: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> f32 {
        self.start + self.length
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn move_to(&mut self, position: impl Into<Vec3>) -> &mut Self {
        self.destination.move_to = Some(position.into());
        self
    }

    pub fn translate(&mut self, delta: impl Into<Vec3>) -> &mut Self {
        self.destination.translate = delta.into();
        self.destination.move_to = None;
        self
    }

    pub fn rotate(&mut self, rad: f32, axis: impl Into<Vec3>) -> &mut Self {
        self.destination.rotate_rad = rad;
        self.destination.rotate_axis = axis.into();
        self
    }

    pub fn scale(&mut self, ratios: impl Into<Vec3>) -> &mut Self {
        self.destination.scale_delta = ratios.into() - Vec3::ONE;
        self
    }

    /// Moves the target to where it is `ms` into the timeline.
    /// Returns `true` when the target's overlay changed.
    pub fn apply_at<T: AnimationTarget + ?Sized>(&mut self, ms: f32, targets: &mut T) -> bool {
        if ms < self.start || self.finished {
            return false;
        }
        let passed = ms - self.start;
        if passed >= self.length {
            return self.finish(targets);
        }
        let Some(transform) = targets.transform_mut(self.target) else {
            log::trace!("clip `{}` target is gone", self.id);
            return false;
        };
        let destination = self.resolved_translation(transform.position);
        let ease = |change: f32| expo_ease_out(passed, 0.0, change, self.length);
        let overlay = Overlay {
            translation: Vec3::new(ease(destination.x), ease(destination.y), ease(destination.z)),
            rotation: self.rotation(ease(self.destination.rotate_rad)),
            scale: Vec3::new(
                ease(self.destination.scale_delta.x),
                ease(self.destination.scale_delta.y),
                ease(self.destination.scale_delta.z),
            ) + Vec3::ONE,
        };
        transform.set_overlay(&self.id, overlay);
        true
    }

    /// Applies the full destination and marks the clip finished.
    pub fn finish<T: AnimationTarget + ?Sized>(&mut self, targets: &mut T) -> bool {
        self.finished = true;
        let Some(transform) = targets.transform_mut(self.target) else {
            return false;
        };
        let overlay = Overlay {
            translation: self.resolved_translation(transform.position),
            rotation: self.rotation(self.destination.rotate_rad),
            scale: self.destination.scale_delta + Vec3::ONE,
        };
        transform.set_overlay(&self.id, overlay);
        true
    }

    /// Removes the clip's overlay and makes it playable again.
    pub fn reset<T: AnimationTarget + ?Sized>(&mut self, targets: &mut T) {
        self.finished = false;
        if let Some(transform) = targets.transform_mut(self.target) {
            transform.reset_overlay(&self.id);
        }
    }

    fn resolved_translation(&self, position: Vec3) -> Vec3 {
        self.destination
            .move_to
            .map_or(self.destination.translate, |to| to - position)
    }

    fn rotation(&self, rad: f32) -> Quat {
        let axis = self.destination.rotate_axis.normalize_or_zero();
        if axis == Vec3::ZERO || rad == 0.0 {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(axis, rad)
        }
    }
}
