//! GPU Context Abstraction
//!
//! [`GpuContext`] is the capability interface the scene renders through:
//! buffers, programs, uniforms, textures and indexed draws. Handles are
//! opaque keys owned by the context; scenes never touch the underlying
//! GPU objects.
//!
//! Bindings seen by generated programs:
//!
//! | Group | Binding | Resource |
//! |-------|---------|----------|
//! | 0     | 0       | [`DrawUniforms`] (per draw) |
//! | 0     | 1       | generic shape uniform block (programs with generic uniforms) |
//! | 1     | 0, 1    | diffuse texture and sampler (textured programs) |

use std::future::Future;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use image::RgbaImage;
use slotmap::new_key_type;

use crate::errors::Result;
use crate::renderer::pipeline::ShaderSource;
use crate::resources::element::RenderMode;
use crate::resources::vector::Rgba;
use crate::resources::vertices_data::IndexBuffer;
use crate::scene::light::LightUniform;

new_key_type! {
    pub struct BufferId;
    pub struct ProgramId;
    pub struct TextureId;
}

/// Per-draw uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    /// Camera matrix × model.
    pub mvp: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix.
    pub normal: [[f32; 4]; 4],
    pub light: LightUniform,
}

impl DrawUniforms {
    #[must_use]
    pub fn new(model: Mat4, camera: Mat4, light: LightUniform) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            mvp: (camera * model).to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            light,
        }
    }
}

/// Immediate-mode GPU capabilities.
///
/// Implementations may record commands and submit them at
/// [`GpuContext::end_frame`].
pub trait GpuContext {
    /// Creates a vertex buffer holding `contents`.
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Result<BufferId>;

    /// Creates an index buffer drawn with `mode`.
    fn create_index_buffer(&mut self, label: &str, mode: RenderMode, indices: &IndexBuffer) -> Result<BufferId>;

    /// Replaces the contents of a vertex buffer, growing it when needed.
    fn write_buffer(&mut self, buffer: BufferId, contents: &[u8]) -> Result<()>;

    fn destroy_buffer(&mut self, buffer: BufferId);

    /// Compiles and links a program. A failure carries the driver log in
    /// [`TesseraError::ShaderCompile`](crate::errors::TesseraError::ShaderCompile).
    fn compile_program(&mut self, source: &ShaderSource) -> impl Future<Output = Result<ProgramId>>;

    fn destroy_program(&mut self, program: ProgramId);

    fn use_program(&mut self, program: ProgramId) -> Result<()>;

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferId) -> Result<()>;

    fn set_draw_uniforms(&mut self, uniforms: &DrawUniforms) -> Result<()>;

    /// Uploads the generic uniform block of the bound program.
    fn set_shape_uniforms(&mut self, contents: &[u8]) -> Result<()>;

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureId>;

    fn bind_texture(&mut self, texture: TextureId) -> Result<()>;

    fn destroy_texture(&mut self, texture: TextureId);

    /// Draws every index of `indices` with the bound program and buffers.
    fn draw_indexed(&mut self, mode: RenderMode, indices: BufferId) -> Result<()>;

    fn set_viewport(&mut self, width: u32, height: u32);

    fn clear(&mut self, color: Rgba);

    fn begin_frame(&mut self) -> Result<()>;

    fn end_frame(&mut self) -> Result<()>;
}
