//! Mutable borrows of scene members that report their changes.
//!
//! A guard derefs to the borrowed value and, when dropped, performs the
//! bookkeeping the change requires (storing new vertices, dropping bound
//! flags, refreshing matrices) and emits the matching [`SceneEvent`].
//!
//! ```rust,ignore
//! scene.transform_mut(cube)?.translate(Vec3::X);   // fires TransformChanged
//! scene.shape_mut(cube)?.set_color(Rgba::RED);     // fires GeometryChanged
//! ```

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

use crate::renderer::program_cache::ProgramCache;
use crate::resources::texture::Texture;
use crate::resources::vertices_data::VerticesData;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::observer::{Observers, SceneEvent};
use crate::scene::shape::Shape;
use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, ShapeKey};

/// Registers the texture a shape samples, if the scene does not know it yet.
pub(crate) fn register_texture(textures: &mut FxHashMap<String, Texture>, shape: &Shape) {
    let Some(url) = shape.texture() else {
        return;
    };
    if textures.contains_key(url) {
        return;
    }
    let unit = shape
        .material()
        .and_then(|m| m.diffuse_map.as_ref())
        .filter(|map| map.url == url)
        .map_or(0, |map| map.unit);
    log::debug!("texture `{url}` registered on unit {unit}");
    textures.insert(url.to_string(), Texture::new(url, unit));
}

pub struct ShapeMut<'a> {
    pub(crate) key: ShapeKey,
    pub(crate) shape: &'a mut Shape,
    pub(crate) store: &'a mut VerticesData,
    pub(crate) programs: &'a mut ProgramCache,
    pub(crate) textures: &'a mut FxHashMap<String, Texture>,
    pub(crate) observers: &'a mut Observers,
}

impl ShapeMut<'_> {
    #[inline]
    #[must_use]
    pub fn key(&self) -> ShapeKey {
        self.key
    }
}

impl Deref for ShapeMut<'_> {
    type Target = Shape;

    fn deref(&self) -> &Shape {
        self.shape
    }
}

impl DerefMut for ShapeMut<'_> {
    fn deref_mut(&mut self) -> &mut Shape {
        self.shape
    }
}

impl Drop for ShapeMut<'_> {
    fn drop(&mut self) {
        self.shape.store_new_vertices(self.store);
        register_texture(self.textures, self.shape);
        self.programs.clear_buffered_status();
        self.observers.emit(&SceneEvent::GeometryChanged(self.key));
    }
}

pub struct TransformMut<'a> {
    pub(crate) key: ShapeKey,
    pub(crate) transform: &'a mut Transform,
    pub(crate) programs: &'a mut ProgramCache,
    pub(crate) observers: &'a mut Observers,
}

impl Deref for TransformMut<'_> {
    type Target = Transform;

    fn deref(&self) -> &Transform {
        self.transform
    }
}

impl DerefMut for TransformMut<'_> {
    fn deref_mut(&mut self) -> &mut Transform {
        self.transform
    }
}

impl Drop for TransformMut<'_> {
    fn drop(&mut self) {
        if self.transform.update_local_matrix() {
            self.programs.clear_buffered_status();
            self.observers.emit(&SceneEvent::TransformChanged(self.key));
        }
    }
}

pub struct CameraMut<'a> {
    pub(crate) key: CameraKey,
    pub(crate) camera: &'a mut Camera,
    pub(crate) observers: &'a mut Observers,
}

impl Deref for CameraMut<'_> {
    type Target = Camera;

    fn deref(&self) -> &Camera {
        self.camera
    }
}

impl DerefMut for CameraMut<'_> {
    fn deref_mut(&mut self) -> &mut Camera {
        self.camera
    }
}

impl Drop for CameraMut<'_> {
    fn drop(&mut self) {
        self.camera.update_matrices();
        self.observers.emit(&SceneEvent::CameraChanged(self.key));
    }
}

pub struct LightMut<'a> {
    pub(crate) key: LightKey,
    pub(crate) light: &'a mut Light,
    pub(crate) observers: &'a mut Observers,
}

impl Deref for LightMut<'_> {
    type Target = Light;

    fn deref(&self) -> &Light {
        self.light
    }
}

impl DerefMut for LightMut<'_> {
    fn deref_mut(&mut self) -> &mut Light {
        self.light
    }
}

impl Drop for LightMut<'_> {
    fn drop(&mut self) {
        self.observers.emit(&SceneEvent::LightChanged(self.key));
    }
}
