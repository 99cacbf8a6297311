//! Rendering
//!
//! - `context`: the [`GpuContext`] capability trait and per-draw uniforms
//! - `wgpu_context`: the wgpu implementation
//! - `pipeline`: program source generation and layouts
//! - `program_cache`: one program per feature combination, binding state
//! - `gpu_resources`: upload tracking for buffers and textures

pub mod context;
pub mod gpu_resources;
pub mod pipeline;
pub mod program_cache;
pub mod wgpu_context;

pub use context::{BufferId, DrawUniforms, GpuContext, ProgramId, TextureId};
pub use gpu_resources::{GpuResources, ShapeBuffers};
pub use program_cache::{LinkSummary, ProgramCache, ProgramKey, ProgramState};
pub use wgpu_context::WgpuContext;
