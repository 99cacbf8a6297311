//! Scene graph
//!
//! - [`Shape`]: drawable node owning its elements and [`Transform`]
//! - [`Camera`], [`Light`]: view and lighting state
//! - [`Scene`]: arena of shapes plus the shared vertex store, program cache,
//!   observers and animation
//! - [`SceneEvent`]: change notifications

pub mod camera;
pub mod guard;
pub mod light;
pub mod observer;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod shape;
pub mod transform;

pub use camera::{Camera, ProjectionType};
pub use guard::{CameraMut, LightMut, ShapeMut, TransformMut};
pub use light::{Light, LightUniform};
pub use observer::{Observers, SceneEvent};
pub use scene::{FrameStats, Scene};
pub use shape::{BaseType, Shape, ShapeFlags};
pub use transform::{Overlay, Transform};

use slotmap::new_key_type;

new_key_type! {
    pub struct ShapeKey;
    pub struct CameraKey;
    pub struct LightKey;
    pub struct SubscriptionId;
}
