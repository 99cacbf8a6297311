use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use glam::Vec3;
use smallvec::SmallVec;

use crate::errors::{Result, TesseraError};
use crate::resources::element::{Element, RenderMode};
use crate::resources::material::Material;
use crate::resources::render_data::{AttributeData, RenderData};
use crate::resources::variable_set::{VariableDescriptor, VariableKind, VariableSet};
use crate::resources::vector::{Rgba, TextureCoord};
use crate::resources::version_tracker::ChangeTracker;
use crate::resources::vertices_data::VerticesData;
use crate::scene::ShapeKey;
use crate::scene::transform::Transform;

/// Shader family a shape is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BaseType {
    #[default]
    Basic,
    Point,
}

impl BaseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Point => "point",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Rendering features of a shape.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShapeFlags: u8 {
        /// Never drawn with the lit program variant, even when the scene
        /// has an active light.
        const UNLIT = 1 << 0;
        const TEXTURE = 1 << 1;
    }
}

/// A drawable node of the scene tree.
///
/// # Ownership
///
/// A shape exclusively owns its elements and transform. Vertex indices are
/// resolved against the scene's shared [`VerticesData`], which is passed in
/// explicitly wherever it is needed.
///
/// # Caching
///
/// [`Shape::render_data`] is computed lazily and cached until the next
/// structural change ([`Shape::invalidate`]). Transform changes do not
/// invalidate it; the model matrix is always computed on demand.
#[derive(Debug, Clone)]
pub struct Shape {
    id: String,
    kind: String,
    base: BaseType,
    flags: ShapeFlags,
    color: Rgba,
    material: Option<Material>,
    texture: Option<String>,

    elements: Vec<Element>,
    by_mode: BTreeMap<RenderMode, SmallVec<[usize; 4]>>,

    pub(crate) transform: Transform,
    pub(crate) parent: Option<ShapeKey>,
    pub(crate) children: Vec<ShapeKey>,

    variables: VariableSet,
    attribute_data: Vec<AttributeData>,
    uniform_values: Vec<(String, Vec<f32>)>,

    render_data: Option<RenderData>,
    tracker: ChangeTracker,
}

impl Shape {
    /// An empty `basic` shape of the given kind name.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self {
            id: format!("{kind}-{}", uuid::Uuid::new_v4()),
            kind,
            base: BaseType::Basic,
            flags: ShapeFlags::empty(),
            color: Rgba::WHITE,
            material: None,
            texture: None,
            elements: Vec::new(),
            by_mode: BTreeMap::new(),
            transform: Transform::new(),
            parent: None,
            children: Vec::new(),
            variables: VariableSet::new(),
            attribute_data: Vec::new(),
            uniform_values: Vec::new(),
            render_data: None,
            tracker: ChangeTracker::new(),
        }
    }

    // ========================================================================
    // Construction helpers
    // ========================================================================

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: BaseType) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<Rgba>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ShapeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Places the local origin at `position` in the parent frame.
    #[must_use]
    pub fn with_position(mut self, position: impl Into<Vec3>) -> Self {
        self.transform.translate(position.into());
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.set_material(material);
        self
    }

    /// Attaches a texture by url and turns on the texture feature.
    #[must_use]
    pub fn with_texture(mut self, url: impl Into<String>) -> Self {
        self.set_texture(url);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> BaseType {
        self.base
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> ShapeFlags {
        self.flags
    }

    #[inline]
    #[must_use]
    pub fn is_unlit(&self) -> bool {
        self.flags.contains(ShapeFlags::UNLIT)
    }

    #[inline]
    #[must_use]
    pub fn has_texture(&self) -> bool {
        self.flags.contains(ShapeFlags::TEXTURE)
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> Rgba {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements drawn with `mode`, in insertion order.
    pub fn elements_by_mode(&self, mode: RenderMode) -> impl Iterator<Item = &Element> {
        self.by_mode
            .get(&mode)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|&i| &self.elements[i]))
    }

    /// Modes used by this shape, in draw order.
    pub fn modes(&self) -> impl Iterator<Item = RenderMode> + '_ {
        self.by_mode.keys().copied()
    }

    /// Number of authored vertices over every element.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.elements.iter().map(Element::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ShapeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ShapeKey] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    /// Local transform. Edit it through [`Scene::transform_mut`] so the
    /// change is reported.
    ///
    /// [`Scene::transform_mut`]: crate::scene::Scene::transform_mut
    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Appends an element. Elements with an id already present are ignored.
    pub fn add_element(&mut self, element: Element) -> bool {
        if self.elements.iter().any(|e| e.id() == element.id()) {
            return false;
        }
        let slot = self.elements.len();
        self.by_mode.entry(element.mode()).or_default().push(slot);
        self.elements.push(element);
        self.invalidate();
        true
    }

    pub fn add_elements(&mut self, elements: impl IntoIterator<Item = Element>) {
        for element in elements {
            self.add_element(element);
        }
    }

    pub fn set_color(&mut self, color: impl Into<Rgba>) {
        self.color = color.into();
        self.invalidate();
    }

    pub fn set_material(&mut self, material: Material) {
        if let Some(map) = &material.diffuse_map {
            self.texture = Some(map.url.clone());
            self.flags |= ShapeFlags::TEXTURE;
        }
        self.material = Some(material);
        self.invalidate();
    }

    pub fn set_texture(&mut self, url: impl Into<String>) {
        self.texture = Some(url.into());
        self.flags |= ShapeFlags::TEXTURE;
        self.invalidate();
    }

    /// Assigns one texture coordinate per authored vertex, in authoring
    /// order. The counts must match exactly.
    pub fn set_texture_coords(&mut self, coords: &[TextureCoord]) -> Result<()> {
        let vertices = self.vertex_count();
        if coords.len() != vertices {
            return Err(TesseraError::TextureCoordMismatch {
                vertices,
                coords: coords.len(),
            });
        }
        let mut next = coords.iter();
        for element in &mut self.elements {
            element.map_vertices(|v| {
                let texture = next.next().copied().unwrap_or(TextureCoord::NONE);
                v.to_builder().texture(texture).build()
            });
        }
        self.invalidate();
        Ok(())
    }

    /// Declares a shader variable. Returns `false` if the name was taken.
    pub fn declare(&mut self, descriptor: VariableDescriptor) -> bool {
        let added = self.variables.add(descriptor);
        if added {
            self.invalidate();
        }
        added
    }

    /// Appends per-vertex data for a declared attribute or varying. The
    /// stream is padded with its last value up to the current vertex count.
    pub fn set_attribute_data(&mut self, name: &str, values: &[f32]) -> Result<()> {
        let descriptor = self
            .variables
            .get(name)
            .filter(|d| d.kind() != VariableKind::Uniform)
            .ok_or_else(|| TesseraError::InvalidVariable(format!("`{name}` is not a declared attribute or varying")))?;
        let attribute = descriptor.attribute_name().into_owned();
        let gl_type = descriptor.gl_type();
        let vertex_count = self.vertex_count();

        match self.attribute_data.iter_mut().find(|a| a.name == attribute) {
            Some(data) => data.push(values, vertex_count),
            None => {
                let mut data = AttributeData::new(attribute, gl_type);
                data.push(values, vertex_count);
                self.attribute_data.push(data);
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Sets the value of a declared uniform.
    pub fn set_uniform(&mut self, name: &str, values: &[f32]) -> Result<()> {
        let descriptor = self
            .variables
            .get(name)
            .filter(|d| d.kind() == VariableKind::Uniform)
            .ok_or_else(|| TesseraError::InvalidVariable(format!("`{name}` is not a declared uniform")))?;
        let expected = descriptor.gl_type().components();
        if values.len() != expected {
            return Err(TesseraError::InvalidVariable(format!(
                "`{name}` takes {expected} values, got {}",
                values.len()
            )));
        }
        match self.uniform_values.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = values.to_vec(),
            None => self.uniform_values.push((name.to_string(), values.to_vec())),
        }
        self.invalidate();
        Ok(())
    }

    /// Registers every authored vertex with the shared store.
    pub fn register_vertices(&self, store: &mut VerticesData) {
        for element in &self.elements {
            store.add_all(element.vertices());
        }
    }

    /// Stores vertices the shape gained since it was registered. Vertices
    /// already in the store keep their reference counts.
    pub fn store_new_vertices(&self, store: &mut VerticesData) {
        for vertex in self.elements.iter().flat_map(Element::vertices) {
            store.ensure(vertex);
        }
    }

    /// Drops the cached render data.
    pub fn invalidate(&mut self) {
        self.render_data = None;
        self.tracker.changed();
    }

    /// Draw data, computed on first use after a change.
    pub fn render_data(&mut self, store: &mut VerticesData) -> &RenderData {
        if self.render_data.is_none() {
            log::trace!("rebuilding render data of shape `{}`", self.id);
            let vertex_count = self.vertex_count();
            let vertex_indices = self
                .elements
                .iter()
                .flat_map(|e| store.indices_for(e.vertices()))
                .collect();
            let mut attributes = self.attribute_data.clone();
            for data in &mut attributes {
                data.pad_to(vertex_count);
            }
            self.render_data = Some(RenderData {
                indices: RenderData::collect_indices(&self.elements, store),
                vertex_indices,
                vertex_count,
                attributes,
                uniforms: self.uniform_values.clone(),
            });
        }
        self.render_data.get_or_insert_default()
    }

    /// Cached render data, if it is current.
    #[must_use]
    pub fn cached_render_data(&self) -> Option<&RenderData> {
        self.render_data.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::variable_set::GlType;

    #[test]
    fn render_data_is_cached_until_change() {
        let mut store = VerticesData::new();
        let mut shape = Shape::new("lines");
        shape.add_element(
            Element::lines()
                .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]])
                .build()
                .unwrap(),
        );
        assert_eq!(shape.render_data(&mut store).index_count(), 2);
        assert!(shape.cached_render_data().is_some());
        shape.set_color(Rgba::RED);
        assert!(shape.cached_render_data().is_none());
    }

    #[test]
    fn uniform_arity_is_checked() {
        let mut shape = Shape::new("shape");
        shape.declare(VariableDescriptor::uniform("u_Tint", GlType::Vec4).unwrap());
        assert!(shape.set_uniform("u_Tint", &[1.0, 0.0]).is_err());
        assert!(shape.set_uniform("u_Tint", &[1.0, 0.0, 0.0, 1.0]).is_ok());
    }
}
