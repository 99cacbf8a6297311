//! Shared test fixtures: a [`GpuContext`] that records every call instead of
//! talking to a GPU.

#![allow(dead_code)]

use image::RgbaImage;
use slotmap::SlotMap;

use tessera::errors::{Result, TesseraError};
use tessera::renderer::pipeline::ShaderSource;
use tessera::renderer::{BufferId, DrawUniforms, GpuContext, ProgramId, TextureId};
use tessera::resources::{IndexBuffer, RenderMode, Rgba};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateVertexBuffer { label: String, bytes: usize },
    CreateIndexBuffer { mode: RenderMode, indices: Vec<u32> },
    WriteBuffer { bytes: usize },
    DestroyBuffer,
    CompileProgram(String),
    UseProgram(String),
    BindVertexBuffer(u32),
    DrawUniforms,
    ShapeUniforms(Vec<f32>),
    CreateTexture(String),
    BindTexture(String),
    Draw { mode: RenderMode, count: usize },
    Viewport(u32, u32),
    Clear(Rgba),
    BeginFrame,
    EndFrame,
}

#[derive(Default)]
pub struct RecordingContext {
    pub calls: Vec<Call>,
    /// Program names whose compilation fails.
    pub failing: Vec<String>,
    pub draw_uniforms: Vec<DrawUniforms>,
    buffers: SlotMap<BufferId, Vec<u32>>,
    programs: SlotMap<ProgramId, String>,
    textures: SlotMap<TextureId, String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| (*n).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draws(&self) -> Vec<(RenderMode, usize)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { mode, count } => Some((*mode, *count)),
                _ => None,
            })
            .collect()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }
}

impl GpuContext for RecordingContext {
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Result<BufferId> {
        self.calls.push(Call::CreateVertexBuffer {
            label: label.to_string(),
            bytes: contents.len(),
        });
        Ok(self.buffers.insert(Vec::new()))
    }

    fn create_index_buffer(&mut self, _label: &str, mode: RenderMode, indices: &IndexBuffer) -> Result<BufferId> {
        let indices = indices.to_u32();
        self.calls.push(Call::CreateIndexBuffer {
            mode,
            indices: indices.clone(),
        });
        Ok(self.buffers.insert(indices))
    }

    fn write_buffer(&mut self, buffer: BufferId, contents: &[u8]) -> Result<()> {
        if !self.buffers.contains_key(buffer) {
            return Err(TesseraError::UnknownResource("buffer".into()));
        }
        self.calls.push(Call::WriteBuffer { bytes: contents.len() });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(buffer);
        self.calls.push(Call::DestroyBuffer);
    }

    async fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId> {
        let name = source.key.name();
        self.calls.push(Call::CompileProgram(name.clone()));
        if self.failing.contains(&name) {
            return Err(TesseraError::ShaderCompile {
                key: name.clone(),
                log: format!("error: `{name}` rejected by the recording driver"),
            });
        }
        Ok(self.programs.insert(name))
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(program);
    }

    fn use_program(&mut self, program: ProgramId) -> Result<()> {
        let name = self
            .programs
            .get(program)
            .cloned()
            .ok_or_else(|| TesseraError::UnknownResource("program".into()))?;
        self.calls.push(Call::UseProgram(name));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, slot: u32, _buffer: BufferId) -> Result<()> {
        self.calls.push(Call::BindVertexBuffer(slot));
        Ok(())
    }

    fn set_draw_uniforms(&mut self, uniforms: &DrawUniforms) -> Result<()> {
        self.draw_uniforms.push(*uniforms);
        self.calls.push(Call::DrawUniforms);
        Ok(())
    }

    fn set_shape_uniforms(&mut self, contents: &[u8]) -> Result<()> {
        let floats: Vec<f32> = contents
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        self.calls.push(Call::ShapeUniforms(floats));
        Ok(())
    }

    fn create_texture(&mut self, label: &str, _image: &RgbaImage) -> Result<TextureId> {
        self.calls.push(Call::CreateTexture(label.to_string()));
        Ok(self.textures.insert(label.to_string()))
    }

    fn bind_texture(&mut self, texture: TextureId) -> Result<()> {
        let label = self
            .textures
            .get(texture)
            .cloned()
            .ok_or_else(|| TesseraError::UnknownResource("texture".into()))?;
        self.calls.push(Call::BindTexture(label));
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }

    fn draw_indexed(&mut self, mode: RenderMode, indices: BufferId) -> Result<()> {
        let count = self
            .buffers
            .get(indices)
            .map(Vec::len)
            .ok_or_else(|| TesseraError::UnknownResource("index buffer".into()))?;
        self.calls.push(Call::Draw { mode, count });
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(Call::Clear(color));
    }

    fn begin_frame(&mut self) -> Result<()> {
        self.calls.push(Call::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.calls.push(Call::EndFrame);
        Ok(())
    }
}
