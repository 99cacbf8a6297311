use futures::future::join_all;
use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::animation::{Animation, AnimationEvent};
use crate::assets::{AssetReader, TextureLoad, load_texture};
use crate::config::{SceneConfig, SceneRange};
use crate::errors::{Result, TesseraError};
use crate::renderer::context::{DrawUniforms, GpuContext};
use crate::renderer::gpu_resources::GpuResources;
use crate::renderer::program_cache::{LinkSummary, ProgramCache, ProgramKey, ProgramState};
use crate::resources::primitives::{GridOptions, create_grid};
use crate::resources::texture::Texture;
use crate::resources::vector::Rgba;
use crate::resources::vertices_data::VerticesData;
use crate::scene::camera::Camera;
use crate::scene::guard::{CameraMut, LightMut, ShapeMut, TransformMut, register_texture};
use crate::scene::light::{Light, LightUniform};
use crate::scene::observer::{Observers, SceneEvent};
use crate::scene::shape::Shape;
use crate::scene::{CameraKey, LightKey, ShapeKey, SubscriptionId};

/// Counters of one [`Scene::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub program_switches: usize,
    pub buffer_uploads: usize,
    pub shapes_drawn: usize,
    /// Shapes without indices or without a linked program.
    pub shapes_skipped: usize,
}

/// A retained scene: shapes, cameras and lights over one shared vertex store.
///
/// # Ownership
///
/// The scene owns the [`VerticesData`] every shape indexes into, the program
/// cache, and the GPU-side bookkeeping. GPU objects themselves belong to the
/// [`GpuContext`] passed to [`Scene::link`] and [`Scene::render`]; the scene
/// only keeps their handles.
///
/// # Frame lifecycle
///
/// ```rust,ignore
/// let mut scene = Scene::new(&SceneConfig::new("main", 8.0, 6.0, 20.0))?;
/// let cube = scene.add_shape(create_cube(&CubeOptions::default())?);
/// scene.link(&mut ctx).await;
/// loop {
///     scene.update_animation(16.0);
///     scene.render(&mut ctx)?;
/// }
/// ```
pub struct Scene {
    pub id: String,
    range: SceneRange,
    background: Rgba,

    store: VerticesData,
    shapes: SlotMap<ShapeKey, Shape>,
    order: Vec<ShapeKey>,

    cameras: SlotMap<CameraKey, Camera>,
    active_camera: Option<CameraKey>,
    lights: SlotMap<LightKey, Light>,
    active_light: Option<LightKey>,

    programs: ProgramCache,
    gpu: GpuResources,

    textures: FxHashMap<String, Texture>,
    texture_tx: flume::Sender<TextureLoad>,
    texture_rx: flume::Receiver<TextureLoad>,

    observers: Observers,
    animation: Animation,
    grid: Option<ShapeKey>,
}

impl Scene {
    /// Builds a scene with the camera, light and ground grid the config
    /// asks for.
    pub fn new(config: &SceneConfig) -> Result<Self> {
        let range = config.range()?;
        let (texture_tx, texture_rx) = flume::unbounded();
        let mut scene = Self {
            id: config.id.clone(),
            range,
            background: Rgba::from(config.background_color),
            store: VerticesData::new(),
            shapes: SlotMap::with_key(),
            order: Vec::new(),
            cameras: SlotMap::with_key(),
            active_camera: None,
            lights: SlotMap::with_key(),
            active_light: None,
            programs: ProgramCache::new(),
            gpu: GpuResources::new(),
            textures: FxHashMap::default(),
            texture_tx,
            texture_rx,
            observers: Observers::new(),
            animation: Animation::new(),
            grid: None,
        };

        if let Some(camera) = &config.camera {
            scene.add_camera(Camera::from_config(camera));
        }
        if let Some(light) = &config.light {
            scene.add_light(Light::from_config(light));
        }
        if let Some(grid) = &config.grid {
            let options = GridOptions {
                width: if grid.width > 0.0 { grid.width } else { range.width },
                depth: if grid.depth > 0.0 { grid.depth } else { range.depth },
                ..grid.clone()
            };
            let key = scene.add_shape(create_grid(&options)?);
            scene.grid = Some(key);
        }

        log::info!(
            "scene `{}` created ({} x {} x {})",
            scene.id,
            range.width,
            range.height,
            range.depth
        );
        Ok(scene)
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> SceneRange {
        self.range
    }

    #[inline]
    #[must_use]
    pub fn background(&self) -> Rgba {
        self.background
    }

    pub fn set_background(&mut self, color: impl Into<Rgba>) {
        self.background = color.into();
    }

    /// The ground grid, when the config asked for one.
    #[must_use]
    pub fn grid(&self) -> Option<ShapeKey> {
        self.grid
    }

    /// The shared vertex store.
    #[must_use]
    pub fn vertices(&self) -> &VerticesData {
        &self.store
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    /// Adds a top-level shape, registers its vertices and requests its
    /// program.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeKey {
        let key = self.insert_shape(shape);
        self.observers.emit(&SceneEvent::ShapeAdded(key));
        key
    }

    /// Adds `child` under `parent`. The child's transform is relative to
    /// its parent.
    pub fn add_child(&mut self, parent: ShapeKey, child: Shape) -> Result<ShapeKey> {
        if !self.shapes.contains_key(parent) {
            return Err(TesseraError::UnknownShape);
        }
        let key = self.insert_shape(child);
        if let Some(shape) = self.shapes.get_mut(key) {
            shape.parent = Some(parent);
        }
        if let Some(shape) = self.shapes.get_mut(parent) {
            shape.children.push(key);
        }
        self.observers.emit(&SceneEvent::ShapeAdded(key));
        Ok(key)
    }

    fn insert_shape(&mut self, shape: Shape) -> ShapeKey {
        shape.register_vertices(&mut self.store);
        register_texture(&mut self.textures, &shape);
        let program = self.key_for(&shape);
        self.programs.request(program, shape.variables());
        log::debug!(
            "shape `{}` added ({} vertices, program `{program}`)",
            shape.id(),
            shape.vertex_count()
        );
        let key = self.shapes.insert(shape);
        self.order.push(key);
        key
    }

    #[must_use]
    pub fn shape(&self, key: ShapeKey) -> Option<&Shape> {
        self.shapes.get(key)
    }

    /// Mutable access to a shape. Dropping the guard stores any vertices
    /// the edit introduced and fires [`SceneEvent::GeometryChanged`].
    pub fn shape_mut(&mut self, key: ShapeKey) -> Result<ShapeMut<'_>> {
        let shape = self.shapes.get_mut(key).ok_or(TesseraError::UnknownShape)?;
        Ok(ShapeMut {
            key,
            shape,
            store: &mut self.store,
            programs: &mut self.programs,
            textures: &mut self.textures,
            observers: &mut self.observers,
        })
    }

    /// Mutable access to a shape's transform. Dropping the guard fires
    /// [`SceneEvent::TransformChanged`] if the transform changed.
    pub fn transform_mut(&mut self, key: ShapeKey) -> Result<TransformMut<'_>> {
        let shape = self.shapes.get_mut(key).ok_or(TesseraError::UnknownShape)?;
        Ok(TransformMut {
            key,
            transform: &mut shape.transform,
            programs: &mut self.programs,
            observers: &mut self.observers,
        })
    }

    /// Removes a shape and its whole subtree. Returns the removed keys,
    /// parents first.
    pub fn remove_shape(&mut self, key: ShapeKey) -> Result<Vec<ShapeKey>> {
        let Some(shape) = self.shapes.get(key) else {
            return Err(TesseraError::UnknownShape);
        };
        if let Some(parent) = shape.parent
            && let Some(parent) = self.shapes.get_mut(parent)
        {
            parent.children.retain(|&c| c != key);
        }

        let mut removed = vec![key];
        let mut cursor = 0;
        while cursor < removed.len() {
            if let Some(shape) = self.shapes.get(removed[cursor]) {
                removed.extend_from_slice(&shape.children);
            }
            cursor += 1;
        }

        for &k in &removed {
            if self.shapes.remove(k).is_some() {
                self.gpu.retire(k);
                self.observers.emit(&SceneEvent::ShapeRemoved(k));
            }
            if self.grid == Some(k) {
                self.grid = None;
            }
        }
        self.order.retain(|k| !removed.contains(k));
        self.programs.clear_buffered_status();
        Ok(removed)
    }

    /// Shapes in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = (ShapeKey, &Shape)> {
        self.order.iter().filter_map(|&k| self.shapes.get(k).map(|s| (k, s)))
    }

    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// World matrix of a shape: its ancestors' local matrices folded onto
    /// its own.
    #[must_use]
    pub fn model_matrix(&self, key: ShapeKey) -> Option<Mat4> {
        world_matrix(&self.shapes, key).map(Mat4::from)
    }

    /// The program a shape is drawn with under the current light setup.
    #[must_use]
    pub fn program_key_for(&self, key: ShapeKey) -> Option<ProgramKey> {
        self.shapes.get(key).map(|shape| self.key_for(shape))
    }

    fn key_for(&self, shape: &Shape) -> ProgramKey {
        let light = self.active_light.is_some() && !shape.is_unlit();
        ProgramKey::new(shape.base(), light, shape.has_texture())
    }

    #[must_use]
    pub fn program_state(&self, key: ProgramKey) -> ProgramState {
        self.programs.state(key)
    }

    #[must_use]
    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    // ========================================================================
    // Cameras and lights
    // ========================================================================

    /// Adds a camera bound to the scene range. The first camera becomes
    /// active.
    pub fn add_camera(&mut self, mut camera: Camera) -> CameraKey {
        camera.set_range(self.range);
        log::debug!("camera `{}` added", camera.id);
        let key = self.cameras.insert(camera);
        if self.active_camera.is_none() {
            self.active_camera = Some(key);
        }
        self.observers.emit(&SceneEvent::CameraChanged(key));
        key
    }

    pub fn use_camera(&mut self, id: &str) -> Result<CameraKey> {
        let key = self
            .cameras
            .iter()
            .find(|(_, c)| c.id == id)
            .map(|(k, _)| k)
            .ok_or_else(|| TesseraError::UnknownCamera(id.to_string()))?;
        if self.active_camera != Some(key) {
            self.active_camera = Some(key);
            self.observers.emit(&SceneEvent::CameraChanged(key));
        }
        Ok(key)
    }

    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.active_camera.and_then(|k| self.cameras.get(k))
    }

    pub fn camera_mut(&mut self, key: CameraKey) -> Option<CameraMut<'_>> {
        let camera = self.cameras.get_mut(key)?;
        Some(CameraMut {
            key,
            camera,
            observers: &mut self.observers,
        })
    }

    /// Adds a light. The first light becomes active and switches lit shapes
    /// to lit programs from the next [`Scene::link`].
    pub fn add_light(&mut self, light: Light) -> LightKey {
        log::debug!("light `{}` added", light.id);
        let key = self.lights.insert(light);
        if self.active_light.is_none() {
            self.active_light = Some(key);
        }
        self.observers.emit(&SceneEvent::LightChanged(key));
        key
    }

    pub fn use_light(&mut self, id: &str) -> Result<LightKey> {
        let key = self
            .lights
            .iter()
            .find(|(_, l)| l.id == id)
            .map(|(k, _)| k)
            .ok_or_else(|| TesseraError::UnknownLight(id.to_string()))?;
        if self.active_light != Some(key) {
            self.active_light = Some(key);
            self.observers.emit(&SceneEvent::LightChanged(key));
        }
        Ok(key)
    }

    #[must_use]
    pub fn light(&self) -> Option<&Light> {
        self.active_light.and_then(|k| self.lights.get(k))
    }

    pub fn light_mut(&mut self, key: LightKey) -> Option<LightMut<'_>> {
        let light = self.lights.get_mut(key)?;
        Some(LightMut {
            key,
            light,
            observers: &mut self.observers,
        })
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn subscribe(&mut self, callback: impl FnMut(&SceneEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// A receiver of every event fired from now on.
    pub fn event_channel(&mut self) -> flume::Receiver<SceneEvent> {
        self.observers.channel()
    }

    // ========================================================================
    // Textures
    // ========================================================================

    /// Sender that texture loads report to. Loads that finish after the
    /// scene is dropped are discarded.
    #[must_use]
    pub fn texture_sink(&self) -> flume::Sender<TextureLoad> {
        self.texture_tx.clone()
    }

    /// Urls of registered textures whose image has not arrived.
    #[must_use]
    pub fn pending_textures(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .textures
            .values()
            .filter(|t| !t.is_loaded())
            .map(|t| t.url().to_string())
            .collect();
        urls.sort();
        urls
    }

    #[must_use]
    pub fn texture(&self, url: &str) -> Option<&Texture> {
        self.textures.get(url)
    }

    /// Loads every pending texture through `reader`, concurrently.
    pub async fn load_textures<R: AssetReader>(&mut self, reader: &R) -> usize {
        let urls = self.pending_textures();
        let sink = &self.texture_tx;
        join_all(urls.iter().map(|url| load_texture(reader, url, sink.clone()))).await;
        self.drain_textures()
    }

    /// Applies finished texture loads. Returns how many images arrived.
    pub fn drain_textures(&mut self) -> usize {
        let mut loaded = 0;
        for load in self.texture_rx.try_iter() {
            match (load.result, self.textures.get_mut(&load.url)) {
                (Ok(image), Some(texture)) => {
                    texture.set_image(image);
                    loaded += 1;
                    self.observers.emit(&SceneEvent::TextureLoaded(load.url));
                }
                (Ok(_), None) => log::debug!("texture `{}` is not used by this scene", load.url),
                (Err(message), _) => {
                    self.observers.emit(&SceneEvent::TextureFailed { url: load.url, message });
                }
            }
        }
        if loaded > 0 {
            self.programs.clear_buffered_status();
        }
        loaded
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Requests the program of every shape under the current light setup
    /// and builds all pending programs.
    ///
    /// Failures are reported in the summary; shapes using a failed program
    /// are skipped by [`Scene::render`].
    pub async fn link<C: GpuContext>(&mut self, ctx: &mut C) -> LinkSummary {
        for &key in &self.order {
            if let Some(shape) = self.shapes.get(key) {
                let program = self.key_for(shape);
                self.programs.request(program, shape.variables());
            }
        }
        let summary = self.programs.resolve(ctx).await;
        log::info!(
            "scene `{}` linked: {} programs built, {} failed",
            self.id,
            summary.linked.len(),
            summary.failed.len()
        );
        summary
    }

    /// Draws one frame.
    ///
    /// Shapes are grouped by program (in key order, insertion order within a
    /// program); each shape draws its render modes in enum order.
    pub fn render<C: GpuContext>(&mut self, ctx: &mut C) -> Result<FrameStats> {
        self.drain_textures();
        self.gpu.release_retired(ctx);

        let mut stats = FrameStats::default();
        let uploads_before = self.gpu.uploads();

        // Index every shape first; unseen vertices grow the store before
        // it is uploaded.
        for &key in &self.order {
            if let Some(shape) = self.shapes.get_mut(key) {
                shape.render_data(&mut self.store);
            }
        }

        let mut queue: Vec<(ProgramKey, ShapeKey)> = self
            .order
            .iter()
            .filter_map(|&k| self.shapes.get(k).map(|s| (self.key_for(s), k)))
            .collect();
        queue.sort_by_key(|&(program, _)| program);

        let camera = self.camera().map_or(Mat4::IDENTITY, Camera::matrix);
        let light = self.light().map_or(LightUniform::NONE, Light::uniform);

        ctx.begin_frame()?;
        ctx.clear(self.background);
        self.programs.reset_binding();

        let Some(vertex_buffer) = self.gpu.sync_vertices(ctx, &self.store)? else {
            ctx.end_frame()?;
            return Ok(stats);
        };

        for (program, key) in queue {
            let Some(shape) = self.shapes.get(key) else {
                continue;
            };
            let Some(data) = shape.cached_render_data().filter(|d| !d.is_empty()) else {
                stats.shapes_skipped += 1;
                continue;
            };
            let Some(source) = self.programs.source(program).cloned() else {
                log::debug!("shape `{}` skipped: program `{program}` has no source", shape.id());
                stats.shapes_skipped += 1;
                continue;
            };
            if !matches!(self.programs.state(program), ProgramState::Linked(_)) {
                log::debug!("shape `{}` skipped: program `{program}` is not linked", shape.id());
                stats.shapes_skipped += 1;
                continue;
            }

            if self.programs.use_program(ctx, program)? {
                stats.program_switches += 1;
            }
            if !self.programs.is_vertex_bound(program) {
                ctx.bind_vertex_buffer(0, vertex_buffer)?;
                self.programs.mark_vertex_bound(program);
            }

            let buffers = self
                .gpu
                .sync_shape(ctx, key, shape.version(), data, self.store.len(), &source)?
                .clone();
            for (slot, &buffer) in buffers.attribute_buffers.iter().enumerate() {
                ctx.bind_vertex_buffer(slot as u32 + 1, buffer)?;
            }

            if program.texture {
                let url = shape.texture().unwrap_or_default();
                if self.programs.bound_texture(program) != Some(url) {
                    let uploaded = match self.textures.get(url) {
                        Some(texture) => self.gpu.sync_texture(ctx, texture)?,
                        None => None,
                    };
                    let id = match uploaded {
                        Some(id) => id,
                        None => self.gpu.fallback_texture(ctx)?,
                    };
                    ctx.bind_texture(id)?;
                    self.programs.mark_texture_bound(program, url);
                }
            }

            let model = world_matrix(&self.shapes, key).map_or(Mat4::IDENTITY, Mat4::from);
            let lighting = if program.light { light } else { LightUniform::NONE };
            ctx.set_draw_uniforms(&DrawUniforms::new(model, camera, lighting))?;
            if !source.uniform_layout.is_empty() {
                ctx.set_shape_uniforms(&source.uniform_layout.pack(&data.uniforms))?;
            }

            for &(mode, indices) in &buffers.index_buffers {
                ctx.draw_indexed(mode, indices)?;
                stats.draw_calls += 1;
            }
            stats.shapes_drawn += 1;
        }

        ctx.end_frame()?;
        stats.buffer_uploads = self.gpu.uploads() - uploads_before;
        log::trace!("frame: {stats:?}");
        Ok(stats)
    }

    // ========================================================================
    // Animation
    // ========================================================================

    #[must_use]
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    /// Advances the animation by `dt_ms` and reports moved shapes as
    /// [`SceneEvent::TransformChanged`].
    pub fn update_animation(&mut self, dt_ms: f32) -> Vec<AnimationEvent> {
        let events = self.animation.update(dt_ms, &mut self.shapes);
        if events.contains(&AnimationEvent::Frame) {
            for key in self.animation.targets() {
                if let Some(shape) = self.shapes.get_mut(key)
                    && shape.transform.update_local_matrix()
                {
                    self.observers.emit(&SceneEvent::TransformChanged(key));
                }
            }
        }
        events
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Releases every GPU object and empties the scene. Cameras, lights and
    /// subscriptions survive.
    pub fn teardown<C: GpuContext>(&mut self, ctx: &mut C) {
        self.animation.clear(&mut self.shapes);
        self.programs.clear(ctx);
        self.gpu.clear(ctx);
        self.shapes.clear();
        self.order.clear();
        self.grid = None;
        self.textures.clear();
        self.store.clear();
        log::info!("scene `{}` torn down", self.id);
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("shapes", &self.shapes.len())
            .field("vertices", &self.store.len())
            .field("programs", &self.programs.len())
            .field("cameras", &self.cameras.len())
            .field("lights", &self.lights.len())
            .finish_non_exhaustive()
    }
}

fn world_matrix(shapes: &SlotMap<ShapeKey, Shape>, key: ShapeKey) -> Option<Affine3A> {
    let shape = shapes.get(key)?;
    let local = shape.transform.local_matrix();
    Some(match shape.parent {
        Some(parent) => world_matrix(shapes, parent).unwrap_or(Affine3A::IDENTITY) * local,
        None => local,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::config::LightConfig;
    use crate::resources::element::Element;

    fn scene() -> Scene {
        Scene::new(&SceneConfig::new("test", 8.0, 6.0, 20.0)).unwrap()
    }

    fn triangle() -> Shape {
        let mut shape = Shape::new("triangle");
        shape.add_element(
            Element::triangles()
                .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
                .build()
                .unwrap(),
        );
        shape
    }

    #[test]
    fn missing_extent_fails_construction() {
        let err = Scene::new(&SceneConfig::new("s", 4.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, TesseraError::MissingArgument("height")));
    }

    #[test]
    fn child_matrices_fold_the_parent_chain() {
        let mut scene = scene();
        let parent = scene.add_shape(triangle());
        let child = scene.add_child(parent, triangle()).unwrap();
        scene.transform_mut(parent).unwrap().translate(Vec3::X);
        scene.transform_mut(child).unwrap().translate(Vec3::Y);
        let origin = scene.model_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn removing_a_parent_removes_its_subtree() {
        let mut scene = scene();
        let parent = scene.add_shape(triangle());
        let child = scene.add_child(parent, triangle()).unwrap();
        let removed = scene.remove_shape(parent).unwrap();
        assert_eq!(removed, vec![parent, child]);
        assert_eq!(scene.shape_count(), 0);
        assert!(matches!(scene.remove_shape(parent), Err(TesseraError::UnknownShape)));
    }

    #[test]
    fn guards_fire_events_on_drop() {
        let mut scene = scene();
        let key = scene.add_shape(triangle());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scene.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        scene.transform_mut(key).unwrap().translate(Vec3::Z);
        scene.shape_mut(key).unwrap().set_color(Rgba::RED);
        // An untouched transform is not a change.
        drop(scene.transform_mut(key).unwrap());

        assert_eq!(
            *seen.borrow(),
            vec![SceneEvent::TransformChanged(key), SceneEvent::GeometryChanged(key)]
        );
    }

    #[test]
    fn lit_programs_follow_the_active_light() {
        let mut scene = scene();
        let key = scene.add_shape(triangle());
        assert_eq!(scene.program_key_for(key).unwrap().name(), "basic");
        scene.add_light(Light::from_config(&LightConfig::default()));
        assert_eq!(scene.program_key_for(key).unwrap().name(), "basic-light");
        assert!(matches!(scene.use_light("nope"), Err(TesseraError::UnknownLight(_))));
    }

    #[test]
    fn config_grid_fills_the_scene_extent() {
        let config = SceneConfig::new("g", 8.0, 6.0, 20.0).with_grid(GridOptions::default());
        let scene = Scene::new(&config).unwrap();
        let grid = scene.shape(scene.grid().unwrap()).unwrap();
        assert!(grid.is_unlit());
        let max_z = grid.elements()[0]
            .vertices()
            .iter()
            .map(|v| v.coord().z())
            .fold(f32::MIN, f32::max);
        assert!((max_z - 10.0).abs() < 1e-6);
    }
}
