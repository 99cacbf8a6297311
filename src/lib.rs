//! Tessera: a retained-mode scene graph on top of wgpu.
//!
//! Shapes are built from elements whose vertices land in one deduplicating
//! store per scene. Each shape selects a generated shader program by its
//! feature combination; the scene builds programs once, uploads only what
//! changed and draws grouped by program.
//!
//! - [`resources`]: vertices, elements, materials, shape builders
//! - [`scene`]: shapes, cameras, lights, the [`Scene`] itself
//! - [`renderer`]: the [`GpuContext`] seam, program cache, wgpu backend
//! - [`assets`]: obj/mtl/texture loading
//! - [`animation`]: timed transform clips

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use animation::{Animation, AnimationEvent, Motion, PlayState};
pub use assets::{AssetReader, FileAssetReader, MemoryAssetReader, load_obj};
pub use config::{CameraConfig, LightConfig, RenderSettings, SceneConfig};
pub use errors::{Result, TesseraError};
pub use renderer::{GpuContext, ProgramKey, WgpuContext};
pub use resources::primitives::*;
pub use resources::{Element, Material, RenderMode, Rgba, Texture, Vertex, VerticesData};
pub use scene::{BaseType, Camera, FrameStats, Light, Scene, SceneEvent, Shape, ShapeFlags, ShapeKey};
