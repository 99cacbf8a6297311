//! GPU-side state of a scene.
//!
//! Tracks which CPU data has been uploaded and re-uploads only what changed:
//!
//! - the shared vertex buffer follows the store version
//! - a shape's index buffers follow the shape version and the index width
//!   the store length calls for
//! - its generic attribute buffers follow the shape version, the program
//!   source and, when the program has any, the store length
//! - textures follow the texture version

use image::RgbaImage;
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;

use crate::errors::{Result, TesseraError};
use crate::renderer::context::{BufferId, GpuContext, TextureId};
use crate::renderer::pipeline::ShaderSource;
use crate::renderer::pipeline::vertex::format_components;
use crate::resources::element::RenderMode;
use crate::resources::render_data::RenderData;
use crate::resources::texture::Texture;
use crate::resources::vertices_data::{IndexFormat, VerticesData};
use crate::scene::ShapeKey;

/// Buffers of one shape.
#[derive(Debug, Clone)]
pub struct ShapeBuffers {
    shape_version: u64,
    index_format: IndexFormat,
    /// Store length the attribute streams were scattered over; `None`
    /// when the program has no generic attributes.
    attribute_len: Option<usize>,
    source_hash: u128,
    /// In draw order.
    pub index_buffers: Vec<(RenderMode, BufferId)>,
    /// Generic attribute streams; slot `i + 1`.
    pub attribute_buffers: Vec<BufferId>,
}

impl ShapeBuffers {
    fn buffers(&self) -> impl Iterator<Item = BufferId> + '_ {
        self.index_buffers
            .iter()
            .map(|&(_, b)| b)
            .chain(self.attribute_buffers.iter().copied())
    }
}

#[derive(Debug, Default)]
pub struct GpuResources {
    vertex_buffer: Option<(BufferId, u64)>,
    shapes: SecondaryMap<ShapeKey, ShapeBuffers>,
    retired: Vec<ShapeKey>,
    textures: FxHashMap<String, (TextureId, u64)>,
    fallback_texture: Option<TextureId>,
    uploads: usize,
}

impl GpuResources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer uploads issued so far.
    #[must_use]
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Uploads the shared vertex store if it grew since the last call.
    /// Returns `None` for an empty store.
    pub fn sync_vertices<C: GpuContext>(&mut self, ctx: &mut C, store: &VerticesData) -> Result<Option<BufferId>> {
        if store.is_empty() {
            return Ok(None);
        }
        let snapshot = store.dump();
        match self.vertex_buffer {
            Some((id, version)) if version == snapshot.version => return Ok(Some(id)),
            Some((id, _)) => ctx.write_buffer(id, snapshot.as_bytes())?,
            None => {
                let id = ctx.create_vertex_buffer("Shared Vertices", snapshot.as_bytes())?;
                self.vertex_buffer = Some((id, snapshot.version));
            }
        }
        log::debug!("uploaded {} unique vertices", snapshot.count);
        self.uploads += 1;
        let id = self.vertex_buffer.map(|(id, _)| id);
        if let Some((_, version)) = &mut self.vertex_buffer {
            *version = snapshot.version;
        }
        Ok(id)
    }

    /// The buffers of `key`, rebuilt when the shape, the program layout or
    /// the parts of the store length they depend on changed.
    ///
    /// Generic attributes the program expects but the shape never set are
    /// filled with `1.0`.
    pub fn sync_shape<C: GpuContext>(
        &mut self,
        ctx: &mut C,
        key: ShapeKey,
        shape_version: u64,
        data: &RenderData,
        store_len: usize,
        source: &ShaderSource,
    ) -> Result<&ShapeBuffers> {
        let index_format = IndexFormat::for_vertex_count(store_len);
        let attribute_len = if source.vertex_layout.generic_attributes().next().is_some() {
            Some(store_len)
        } else {
            None
        };
        let (indices_current, attributes_current) = self.shapes.get(key).map_or((false, false), |b| {
            let same_shape = b.shape_version == shape_version;
            (
                same_shape && b.index_format == index_format,
                same_shape && b.source_hash == source.hash && b.attribute_len == attribute_len,
            )
        });

        if !(indices_current && attributes_current) {
            let mut buffers = self.shapes.remove(key).unwrap_or_else(|| ShapeBuffers {
                shape_version,
                index_format,
                attribute_len,
                source_hash: source.hash,
                index_buffers: Vec::new(),
                attribute_buffers: Vec::new(),
            });
            if !indices_current {
                for (_, buffer) in buffers.index_buffers.drain(..) {
                    ctx.destroy_buffer(buffer);
                }
                buffers.index_buffers = self.create_index_buffers(ctx, data, store_len)?;
                buffers.index_format = index_format;
            }
            if !attributes_current {
                for buffer in buffers.attribute_buffers.drain(..) {
                    ctx.destroy_buffer(buffer);
                }
                buffers.attribute_buffers = self.create_attribute_buffers(ctx, data, store_len, source)?;
                buffers.attribute_len = attribute_len;
                buffers.source_hash = source.hash;
            }
            buffers.shape_version = shape_version;
            self.shapes.insert(key, buffers);
        }

        self.shapes
            .get(key)
            .ok_or_else(|| TesseraError::UnknownResource("shape buffers".into()))
    }

    fn create_index_buffers<C: GpuContext>(
        &mut self,
        ctx: &mut C,
        data: &RenderData,
        store_len: usize,
    ) -> Result<Vec<(RenderMode, BufferId)>> {
        let mut index_buffers = Vec::new();
        for (mode, indices) in data.index_buffers(store_len)? {
            if indices.is_empty() {
                continue;
            }
            let id = ctx.create_index_buffer(&format!("{} Indices", mode.as_str()), mode, &indices)?;
            index_buffers.push((mode, id));
            self.uploads += 1;
        }
        Ok(index_buffers)
    }

    fn create_attribute_buffers<C: GpuContext>(
        &mut self,
        ctx: &mut C,
        data: &RenderData,
        store_len: usize,
        source: &ShaderSource,
    ) -> Result<Vec<BufferId>> {
        let mut attribute_buffers = Vec::new();
        for (name, format) in source.vertex_layout.generic_attributes() {
            let components = format_components(format);
            let values = match data.attribute(name) {
                Some(stream) if stream.step == components => stream.scatter(&data.vertex_indices, store_len),
                Some(stream) => {
                    log::warn!(
                        "attribute `{name}` has {} values per vertex, program expects {components}; filling with 1.0",
                        stream.step
                    );
                    vec![1.0; store_len * components]
                }
                None => {
                    log::warn!("attribute `{name}` is not set, filling with 1.0");
                    vec![1.0; store_len * components]
                }
            };
            attribute_buffers.push(ctx.create_vertex_buffer(name, bytemuck::cast_slice(&values))?);
            self.uploads += 1;
        }
        Ok(attribute_buffers)
    }

    #[must_use]
    pub fn shape(&self, key: ShapeKey) -> Option<&ShapeBuffers> {
        self.shapes.get(key)
    }

    /// Schedules the buffers of a removed shape for release.
    pub fn retire(&mut self, key: ShapeKey) {
        self.retired.push(key);
    }

    pub fn release_retired<C: GpuContext>(&mut self, ctx: &mut C) {
        for key in std::mem::take(&mut self.retired) {
            if let Some(buffers) = self.shapes.remove(key) {
                for buffer in buffers.buffers() {
                    ctx.destroy_buffer(buffer);
                }
            }
        }
    }

    /// The GPU copy of `texture`, uploaded when missing or outdated.
    /// Returns `None` while the image is not loaded.
    pub fn sync_texture<C: GpuContext>(&mut self, ctx: &mut C, texture: &Texture) -> Result<Option<TextureId>> {
        let Some(image) = texture.image() else {
            return Ok(None);
        };
        if let Some(&(id, version)) = self.textures.get(texture.url()) {
            if version == texture.version() {
                return Ok(Some(id));
            }
            ctx.destroy_texture(id);
        }
        let id = ctx.create_texture(texture.url(), image)?;
        self.textures.insert(texture.url().to_string(), (id, texture.version()));
        self.uploads += 1;
        Ok(Some(id))
    }

    /// A 1×1 white texture for textured programs whose image is not loaded.
    pub fn fallback_texture<C: GpuContext>(&mut self, ctx: &mut C) -> Result<TextureId> {
        if let Some(id) = self.fallback_texture {
            return Ok(id);
        }
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let id = ctx.create_texture("Fallback White", &white)?;
        self.fallback_texture = Some(id);
        Ok(id)
    }

    /// Releases everything.
    pub fn clear<C: GpuContext>(&mut self, ctx: &mut C) {
        if let Some((id, _)) = self.vertex_buffer.take() {
            ctx.destroy_buffer(id);
        }
        for (_, buffers) in self.shapes.drain() {
            for buffer in buffers.buffers() {
                ctx.destroy_buffer(buffer);
            }
        }
        for (_, (id, _)) in self.textures.drain() {
            ctx.destroy_texture(id);
        }
        if let Some(id) = self.fallback_texture.take() {
            ctx.destroy_texture(id);
        }
        self.retired.clear();
    }
}
