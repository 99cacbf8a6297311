//! Keyframe-free animation: timed clips moving shapes through transform
//! overlays.
//!
//! - [`Motion`]: fluent builder of sequential clips on one shape
//! - [`Timeline`]: all clips, conflict checked per target
//! - [`Animation`]: transport (play, pause, stop) driven by frame deltas

pub mod clip;
pub mod easing;
pub mod motion;
pub mod player;
pub mod timeline;

pub use clip::{Clip, Destination};
pub use motion::Motion;
pub use player::{Animation, AnimationEvent, PlayState};
pub use timeline::Timeline;

use slotmap::SlotMap;

use crate::scene::transform::Transform;
use crate::scene::{Shape, ShapeKey};

/// Anything that can hand out the transform of a shape by key.
pub trait AnimationTarget {
    fn transform_mut(&mut self, key: ShapeKey) -> Option<&mut Transform>;
}

impl AnimationTarget for SlotMap<ShapeKey, Shape> {
    fn transform_mut(&mut self, key: ShapeKey) -> Option<&mut Transform> {
        self.get_mut(key).map(|shape| &mut shape.transform)
    }
}
