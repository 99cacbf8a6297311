//! wgpu Context
//!
//! [`WgpuContext`] implements [`GpuContext`] on top of a headless wgpu
//! device rendering into an offscreen color + depth target.
//!
//! Calls between [`GpuContext::begin_frame`] and [`GpuContext::end_frame`]
//! are recorded as commands. `end_frame` uploads the per-draw uniform data
//! into two dynamic-offset buffers (256-byte slots), builds the missing
//! pipelines and replays the commands inside a single render pass.
//!
//! Topologies wgpu lacks are rewritten when an index buffer is created:
//! `TRIANGLE_FAN` becomes a triangle list and `LINE_LOOP` a closed line
//! strip. 8-bit indices are widened to 16 bits.

use std::borrow::Cow;

use image::RgbaImage;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use wgpu::util::DeviceExt;

use crate::config::RenderSettings;
use crate::errors::{Result, TesseraError};
use crate::renderer::context::{BufferId, DrawUniforms, GpuContext, ProgramId, TextureId};
use crate::renderer::pipeline::{ShaderManager, ShaderSource, VertexLayout};
use crate::resources::element::RenderMode;
use crate::resources::vector::Rgba;
use crate::resources::vertices_data::IndexBuffer;

/// Dynamic uniform offsets must be multiples of this.
const UNIFORM_SLOT: u64 = 256;

struct GpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
    /// Format and count of an index buffer.
    index: Option<(wgpu::IndexFormat, u32)>,
}

struct GpuProgram {
    name: String,
    hash: u128,
    module: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    vertex_layout: VertexLayout,
    pipelines: FxHashMap<wgpu::PrimitiveTopology, wgpu::RenderPipeline>,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Growable uniform buffer addressed with dynamic offsets.
struct UniformArena {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl UniformArena {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let capacity = UNIFORM_SLOT * 64;
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) {
        let needed = data.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("growing {} uniforms to {capacity} bytes", self.label);
            self.buffer = Self::allocate(device, self.label, capacity);
            self.capacity = capacity;
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, data);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    UseProgram(ProgramId),
    VertexBuffer { slot: u32, buffer: BufferId },
    Texture(TextureId),
    Draw {
        mode: RenderMode,
        indices: BufferId,
        draw_slot: u32,
        shape_slot: u32,
    },
}

/// Headless wgpu backend.
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    size: (u32, u32),
    color_target: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    clear_color: wgpu::Color,

    shaders: ShaderManager,
    buffers: SlotMap<BufferId, GpuBuffer>,
    programs: SlotMap<ProgramId, GpuProgram>,
    textures: SlotMap<TextureId, GpuTexture>,

    draw_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    draw_uniforms: UniformArena,
    shape_uniforms: UniformArena,

    commands: Vec<Command>,
    draw_data: Vec<u8>,
    shape_data: Vec<Vec<u8>>,
    bound_program: Option<ProgramId>,
    in_frame: bool,
}

impl WgpuContext {
    /// Requests an adapter and device and allocates the offscreen target.
    pub async fn new(settings: &RenderSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| TesseraError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Tessera Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let size = (settings.width.max(1), settings.height.max(1));
        let (color_target, color_view) = Self::create_color_target(&device, size, settings.color_format);
        let depth_view = Self::create_depth_texture(&device, size, settings.depth_format);

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw BindGroup Layout"),
            entries: &[
                uniform_entry(0, std::num::NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64)),
                uniform_entry(1, None),
            ],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let draw_uniforms = UniformArena::new(&device, "Draw Uniforms");
        let shape_uniforms = UniformArena::new(&device, "Shape Uniforms");

        log::info!(
            "wgpu context ready: {} ({:?}), {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            size.0,
            size.1
        );

        Ok(Self {
            device,
            queue,
            color_format: settings.color_format,
            depth_format: settings.depth_format,
            size,
            color_target,
            color_view,
            depth_view,
            clear_color: settings.clear_color,
            shaders: ShaderManager::new(),
            buffers: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            draw_layout,
            texture_layout,
            sampler,
            draw_uniforms,
            shape_uniforms,
            commands: Vec::new(),
            draw_data: Vec::new(),
            shape_data: Vec::new(),
            bound_program: None,
            in_frame: false,
        })
    }

    fn create_color_target(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Color Target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    pub fn create_depth_texture(
        device: &wgpu::Device,
        size: (u32, u32),
        format: wgpu::TextureFormat,
    ) -> wgpu::TextureView {
        let desc = wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        };
        device.create_texture(&desc).create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// The offscreen color target of the last frame.
    #[must_use]
    pub fn color_target(&self) -> &wgpu::Texture {
        &self.color_target
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Number of distinct compiled shader modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.shaders.module_count()
    }

    fn create_pipeline(&self, program: &GpuProgram, topology: wgpu::PrimitiveTopology) -> wgpu::RenderPipeline {
        let attributes: Vec<Vec<wgpu::VertexAttribute>> = program
            .vertex_layout
            .buffers
            .iter()
            .map(|b| b.wgpu_attributes())
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = program
            .vertex_layout
            .buffers
            .iter()
            .zip(&attributes)
            .map(|(b, attrs)| b.as_wgpu(attrs))
            .collect();

        let strip_index_format = match topology {
            wgpu::PrimitiveTopology::LineStrip | wgpu::PrimitiveTopology::TriangleStrip => {
                Some(wgpu::IndexFormat::Uint16)
            }
            _ => None,
        };

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} {topology:?}", program.name)),
            layout: Some(&program.layout),
            vertex: wgpu::VertexState {
                module: &program.module,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: self.depth_format,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Builds every pipeline the recorded draws need.
    fn prepare_pipelines(&mut self) {
        let mut program = None;
        let mut missing = Vec::new();
        for command in &self.commands {
            match *command {
                Command::UseProgram(id) => program = Some(id),
                Command::Draw { mode, .. } => {
                    let topology = topology(mode);
                    if let Some(id) = program
                        && let Some(p) = self.programs.get(id)
                        && !p.pipelines.contains_key(&topology)
                        && !missing.contains(&(id, topology))
                    {
                        missing.push((id, topology));
                    }
                }
                _ => {}
            }
        }
        for (id, topology) in missing {
            let Some(program) = self.programs.get(id) else {
                continue;
            };
            let pipeline = self.create_pipeline(program, topology);
            if let Some(program) = self.programs.get_mut(id) {
                program.pipelines.insert(topology, pipeline);
            }
        }
    }

    /// Lays the shape uniform blobs out in equal slots and returns the
    /// binding window.
    fn pack_shape_uniforms(&self) -> (Vec<u8>, u64) {
        let largest = self.shape_data.iter().map(Vec::len).max().unwrap_or(0) as u64;
        let window = largest.max(16).next_multiple_of(16);
        let stride = window.next_multiple_of(UNIFORM_SLOT);
        let mut packed = vec![0u8; (stride * self.shape_data.len().max(1) as u64) as usize];
        for (i, blob) in self.shape_data.iter().enumerate() {
            let start = i * stride as usize;
            packed[start..start + blob.len()].copy_from_slice(blob);
        }
        (packed, window)
    }

    fn shape_stride(window: u64) -> u64 {
        window.next_multiple_of(UNIFORM_SLOT)
    }
}

fn uniform_entry(binding: u32, min_binding_size: Option<std::num::NonZeroU64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size,
        },
        count: None,
    }
}

/// wgpu topology used to draw `mode` after index rewriting.
#[must_use]
pub fn topology(mode: RenderMode) -> wgpu::PrimitiveTopology {
    match mode {
        RenderMode::Points => wgpu::PrimitiveTopology::PointList,
        RenderMode::Lines => wgpu::PrimitiveTopology::LineList,
        RenderMode::LineStrip | RenderMode::LineLoop => wgpu::PrimitiveTopology::LineStrip,
        RenderMode::Triangles | RenderMode::TriangleFan => wgpu::PrimitiveTopology::TriangleList,
        RenderMode::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

/// 16-bit indices drawable with [`topology`]`(mode)`.
#[must_use]
pub fn rewrite_indices(mode: RenderMode, indices: &IndexBuffer) -> Vec<u16> {
    let wide: Vec<u16> = match indices {
        IndexBuffer::U8(v) => v.iter().map(|&i| u16::from(i)).collect(),
        IndexBuffer::U16(v) => v.clone(),
    };
    match mode {
        RenderMode::TriangleFan => {
            let Some((&hub, rest)) = wide.split_first() else {
                return wide;
            };
            rest.windows(2).flat_map(|w| [hub, w[0], w[1]]).collect()
        }
        RenderMode::LineLoop => {
            let mut closed = wide;
            if let Some(&first) = closed.first() {
                closed.push(first);
            }
            closed
        }
        _ => wide,
    }
}

impl GpuContext for WgpuContext {
    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> Result<BufferId> {
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Ok(self.buffers.insert(GpuBuffer {
            buffer,
            size: contents.len() as u64,
            index: None,
        }))
    }

    fn create_index_buffer(&mut self, label: &str, mode: RenderMode, indices: &IndexBuffer) -> Result<BufferId> {
        let indices = rewrite_indices(mode, indices);
        let contents: &[u8] = bytemuck::cast_slice(&indices);
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::INDEX,
        });
        Ok(self.buffers.insert(GpuBuffer {
            buffer,
            size: contents.len() as u64,
            index: Some((wgpu::IndexFormat::Uint16, indices.len() as u32)),
        }))
    }

    fn write_buffer(&mut self, buffer: BufferId, contents: &[u8]) -> Result<()> {
        let entry = self
            .buffers
            .get_mut(buffer)
            .ok_or_else(|| TesseraError::UnknownResource("vertex buffer".into()))?;
        if contents.len() as u64 > entry.size {
            entry.buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Shared Vertices"),
                contents,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            entry.size = contents.len() as u64;
        } else {
            self.queue.write_buffer(&entry.buffer, 0, contents);
        }
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if let Some(entry) = self.buffers.remove(buffer) {
            entry.buffer.destroy();
        }
    }

    async fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramId> {
        let name = source.name();
        let module = if let Some(module) = self.shaders.get(source.hash) {
            module.clone()
        } else {
            let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
            let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&name),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&source.code)),
            });
            if let Some(error) = scope.pop().await {
                return Err(TesseraError::ShaderCompile {
                    key: name,
                    log: error.to_string(),
                });
            }
            self.shaders.insert(source.hash, module.clone());
            module
        };

        let layout = if source.key.texture {
            self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&name),
                bind_group_layouts: &[Some(&self.draw_layout), Some(&self.texture_layout)],
                immediate_size: 0,
            })
        } else {
            self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&name),
                bind_group_layouts: &[Some(&self.draw_layout)],
                immediate_size: 0,
            })
        };

        log::debug!("compiled program `{name}` ({:032x})", source.hash);
        Ok(self.programs.insert(GpuProgram {
            name,
            hash: source.hash,
            module,
            layout,
            vertex_layout: source.vertex_layout.clone(),
            pipelines: FxHashMap::default(),
        }))
    }

    fn destroy_program(&mut self, program: ProgramId) {
        if let Some(removed) = self.programs.remove(program)
            && !self.programs.values().any(|p| p.hash == removed.hash)
        {
            self.shaders.remove(removed.hash);
        }
    }

    fn use_program(&mut self, program: ProgramId) -> Result<()> {
        if !self.programs.contains_key(program) {
            return Err(TesseraError::UnknownResource("program".into()));
        }
        self.bound_program = Some(program);
        self.commands.push(Command::UseProgram(program));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: BufferId) -> Result<()> {
        if !self.buffers.contains_key(buffer) {
            return Err(TesseraError::UnknownResource("vertex buffer".into()));
        }
        self.commands.push(Command::VertexBuffer { slot, buffer });
        Ok(())
    }

    fn set_draw_uniforms(&mut self, uniforms: &DrawUniforms) -> Result<()> {
        self.draw_data.extend_from_slice(bytemuck::bytes_of(uniforms));
        self.draw_data.resize(self.draw_data.len().next_multiple_of(UNIFORM_SLOT as usize), 0);
        Ok(())
    }

    fn set_shape_uniforms(&mut self, contents: &[u8]) -> Result<()> {
        self.shape_data.push(contents.to_vec());
        Ok(())
    }

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureId> {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        Ok(self.textures.insert(GpuTexture {
            _texture: texture,
            bind_group,
        }))
    }

    fn bind_texture(&mut self, texture: TextureId) -> Result<()> {
        if !self.textures.contains_key(texture) {
            return Err(TesseraError::UnknownResource("texture".into()));
        }
        self.commands.push(Command::Texture(texture));
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }

    fn draw_indexed(&mut self, mode: RenderMode, indices: BufferId) -> Result<()> {
        if self.bound_program.is_none() {
            return Err(TesseraError::UnknownResource("no program bound".into()));
        }
        if self.draw_data.is_empty() {
            return Err(TesseraError::MissingArgument("draw uniforms"));
        }
        let draw_slot = (self.draw_data.len() as u64 / UNIFORM_SLOT - 1) as u32;
        let shape_slot = self.shape_data.len().saturating_sub(1) as u32;
        self.commands.push(Command::Draw {
            mode,
            indices,
            draw_slot,
            shape_slot,
        });
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        let (color_target, color_view) = Self::create_color_target(&self.device, self.size, self.color_format);
        self.color_target = color_target;
        self.color_view = color_view;
        self.depth_view = Self::create_depth_texture(&self.device, self.size, self.depth_format);
    }

    fn clear(&mut self, color: Rgba) {
        self.clear_color = wgpu::Color {
            r: f64::from(color.r()),
            g: f64::from(color.g()),
            b: f64::from(color.b()),
            a: f64::from(color.a()),
        };
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.in_frame {
            log::warn!("begin_frame called twice; dropping the unfinished frame");
        }
        self.commands.clear();
        self.draw_data.clear();
        self.shape_data.clear();
        self.bound_program = None;
        self.in_frame = true;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(TesseraError::MissingArgument("begin_frame"));
        }
        self.in_frame = false;

        self.prepare_pipelines();

        let (shape_bytes, shape_window) = self.pack_shape_uniforms();
        let shape_stride = Self::shape_stride(shape_window);
        self.draw_uniforms.write(&self.device, &self.queue, &self.draw_data);
        self.shape_uniforms.write(&self.device, &self.queue, &shape_bytes);

        let draw_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw BindGroup"),
            layout: &self.draw_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.draw_uniforms.buffer,
                        offset: 0,
                        size: std::num::NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.shape_uniforms.buffer,
                        offset: 0,
                        size: std::num::NonZeroU64::new(shape_window),
                    }),
                },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let mut program = None;
            let mut pipeline_state = None;
            for command in &self.commands {
                match *command {
                    Command::UseProgram(id) => program = self.programs.get(id).map(|p| (id, p)),
                    Command::VertexBuffer { slot, buffer } => {
                        if let Some(entry) = self.buffers.get(buffer) {
                            pass.set_vertex_buffer(slot, entry.buffer.slice(..));
                        }
                    }
                    Command::Texture(id) => {
                        if let Some(texture) = self.textures.get(id) {
                            pass.set_bind_group(1, &texture.bind_group, &[]);
                        }
                    }
                    Command::Draw {
                        mode,
                        indices,
                        draw_slot,
                        shape_slot,
                    } => {
                        let Some((id, gpu_program)) = program else {
                            continue;
                        };
                        let topology = topology(mode);
                        let Some(pipeline) = gpu_program.pipelines.get(&topology) else {
                            continue;
                        };
                        if pipeline_state != Some((id, topology)) {
                            pass.set_pipeline(pipeline);
                            pipeline_state = Some((id, topology));
                        }
                        let Some(GpuBuffer {
                            buffer,
                            index: Some((format, count)),
                            ..
                        }) = self.buffers.get(indices)
                        else {
                            continue;
                        };
                        let offsets = [
                            draw_slot * UNIFORM_SLOT as u32,
                            shape_slot * shape_stride as u32,
                        ];
                        pass.set_bind_group(0, &draw_bind_group, &offsets);
                        pass.set_index_buffer(buffer.slice(..), *format);
                        pass.draw_indexed(0..*count, 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.commands.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_becomes_triangle_list() {
        let fan = IndexBuffer::U8(vec![0, 1, 2, 3, 4]);
        assert_eq!(
            rewrite_indices(RenderMode::TriangleFan, &fan),
            vec![0, 1, 2, 0, 2, 3, 0, 3, 4]
        );
    }

    #[test]
    fn loop_is_closed() {
        let ring = IndexBuffer::U16(vec![3, 4, 5]);
        assert_eq!(rewrite_indices(RenderMode::LineLoop, &ring), vec![3, 4, 5, 3]);
    }

    #[test]
    fn list_modes_pass_through() {
        let tris = IndexBuffer::U8(vec![2, 1, 0]);
        assert_eq!(rewrite_indices(RenderMode::Triangles, &tris), vec![2, 1, 0]);
        assert_eq!(topology(RenderMode::LineLoop), wgpu::PrimitiveTopology::LineStrip);
    }

    /// Builds lit, textured and point pipelines on whatever adapter the
    /// machine offers. Machines without one skip the check.
    #[test]
    fn frame_builds_every_pipeline() {
        use crate::config::{LightConfig, SceneConfig};
        use crate::resources::primitives::{CubeOptions, create_cube, create_points_at};
        use crate::scene::Scene;

        let settings = RenderSettings {
            width: 64,
            height: 64,
            ..RenderSettings::default()
        };
        let Ok(mut ctx) = pollster::block_on(WgpuContext::new(&settings)) else {
            return;
        };
        let config = SceneConfig::new("gpu", 4.0, 4.0, 4.0).with_light(LightConfig::default());
        let mut scene = Scene::new(&config).unwrap();
        scene.add_shape(create_cube(&CubeOptions::default()).unwrap());
        scene.add_shape(create_cube(&CubeOptions::default()).unwrap().with_texture("wood.png"));
        scene.add_shape(create_points_at([[0.0, 0.0, 0.0]], Rgba::RED, 2.0).unwrap());

        let summary = pollster::block_on(scene.link(&mut ctx));
        assert!(summary.failed.is_empty(), "{:?}", summary.failed);
        let stats = scene.render(&mut ctx).unwrap();
        assert_eq!(stats.shapes_drawn, 3);
        assert!(ctx.programs.values().all(|p| !p.pipelines.is_empty()));
    }
}
