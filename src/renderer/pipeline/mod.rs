//! Program source generation
//!
//! - shader_gen: variable set → IR → WGSL
//! - shader_manager: template environment and compiled module cache
//! - vertex: vertex buffer layouts
//! - uniform_layout: generic uniform block packing

pub mod shader_gen;
pub mod shader_manager;
pub mod uniform_layout;
pub mod vertex;

pub use shader_gen::{ShaderGenerator, ShaderIr, ShaderSource, is_reserved};
pub use shader_manager::ShaderManager;
pub use uniform_layout::UniformLayout;
pub use vertex::VertexLayout;
