//! Geometry and surface data, independent of any GPU.
//!
//! - [`vector`]: coordinate, colour, normal and texture coordinate values
//! - [`vertex`]: immutable 13-float vertex records and their identity keys
//! - [`vertices_data`]: the deduplicating vertex store shared by a scene
//! - [`element`]: vertex runs with a render mode
//! - [`variable_set`]: shader variables declared by shapes
//! - [`render_data`]: per-shape draw data derived from elements
//! - [`material`], [`texture`]: surfaces from mtl documents and images
//! - [`primitives`]: shape builders

pub mod element;
pub mod material;
pub mod primitives;
pub mod render_data;
pub mod texture;
pub mod variable_set;
pub mod vector;
pub mod version_tracker;
pub mod vertex;
pub mod vertices_data;

pub use element::{Element, ElementBuilder, ElementKind, RenderMode};
pub use material::{DEFAULT_FACE_COLOR, Material, TextureRef};
pub use render_data::{AttributeData, RenderData};
pub use texture::Texture;
pub use variable_set::{GlType, VariableDescriptor, VariableKind, VariableSet};
pub use vector::{Coordinate, Normal, Rgba, TextureCoord};
pub use version_tracker::ChangeTracker;
pub use vertex::{VERTEX_STRIDE, Vertex, VertexBuilder, VertexKey};
pub use vertices_data::{IndexBuffer, IndexFormat, VerticesData, VerticesSnapshot};
