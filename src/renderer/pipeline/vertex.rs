//! Vertex Layout Generator
//!
//! Slot 0 is the shared vertex store (one 13-float record per unique vertex,
//! locations 0 to 4). Every generic attribute stream gets a buffer slot of
//! its own, in declaration order, starting at location 5.

use std::fmt::Write as _;

use crate::resources::variable_set::GlType;
use crate::resources::vertex::{VERTEX_OFFSETS, VERTEX_STRIDE};

/// Reserved per-vertex inputs backed by the shared store.
pub const BUILTIN_ATTRIBUTES: [(&str, GlType, usize); 5] = [
    ("a_Position", GlType::Vec3, VERTEX_OFFSETS.coord),
    ("a_PointSize", GlType::Float, VERTEX_OFFSETS.size),
    ("a_Color", GlType::Vec4, VERTEX_OFFSETS.color),
    ("a_Normal", GlType::Vec3, VERTEX_OFFSETS.normal),
    ("a_TexCoord", GlType::Vec2, VERTEX_OFFSETS.texture),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttributeDesc {
    pub name: String,
    pub format: wgpu::VertexFormat,
    /// Byte offset inside the buffer record.
    pub offset: u64,
    pub location: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferDesc {
    pub array_stride: u64,
    pub attributes: Vec<VertexAttributeDesc>,
}

impl VertexBufferDesc {
    /// Borrowed wgpu layout; `attributes` must outlive the result.
    #[must_use]
    pub fn as_wgpu<'a>(&self, attributes: &'a [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    #[must_use]
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format,
                offset: a.offset,
                shader_location: a.location,
            })
            .collect()
    }
}

/// Buffer slots of one program, slot 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub buffers: Vec<VertexBufferDesc>,
}

impl VertexLayout {
    /// The layout for the given generic streams.
    #[must_use]
    pub fn new<'a>(generic: impl IntoIterator<Item = (&'a str, GlType)>) -> Self {
        let f32_size = std::mem::size_of::<f32>() as u64;
        let store = VertexBufferDesc {
            array_stride: VERTEX_STRIDE as u64 * f32_size,
            attributes: BUILTIN_ATTRIBUTES
                .iter()
                .enumerate()
                .map(|(location, &(name, ty, offset))| VertexAttributeDesc {
                    name: name.to_string(),
                    format: vertex_format(ty),
                    offset: offset as u64 * f32_size,
                    location: location as u32,
                })
                .collect(),
        };

        let mut buffers = vec![store];
        let mut location = BUILTIN_ATTRIBUTES.len() as u32;
        for (name, ty) in generic {
            buffers.push(VertexBufferDesc {
                array_stride: ty.components() as u64 * f32_size,
                attributes: vec![VertexAttributeDesc {
                    name: name.to_string(),
                    format: vertex_format(ty),
                    offset: 0,
                    location,
                }],
            });
            location += 1;
        }
        Self { buffers }
    }

    /// Names of the generic streams, in slot order (slot 1 first).
    pub fn generic_attributes(&self) -> impl Iterator<Item = (&str, wgpu::VertexFormat)> {
        self.buffers
            .iter()
            .skip(1)
            .flat_map(|b| b.attributes.iter().map(|a| (a.name.as_str(), a.format)))
    }

    /// `struct VertexInput { ... }` for the WGSL vertex stage.
    #[must_use]
    pub fn vertex_input_code(&self) -> String {
        let mut code = String::from("struct VertexInput {\n");
        for attribute in self.buffers.iter().flat_map(|b| &b.attributes) {
            let _ = writeln!(
                code,
                "    @location({}) {}: {},",
                attribute.location,
                attribute.name,
                format_to_wgsl_type(attribute.format)
            );
        }
        code.push_str("};\n");
        code
    }
}

/// Float vertex format carrying `ty`. Booleans travel as `f32`.
#[must_use]
pub fn vertex_format(ty: GlType) -> wgpu::VertexFormat {
    match ty {
        GlType::Vec2 => wgpu::VertexFormat::Float32x2,
        GlType::Vec3 => wgpu::VertexFormat::Float32x3,
        GlType::Vec4 => wgpu::VertexFormat::Float32x4,
        GlType::Bool | GlType::Float | GlType::Mat4 | GlType::Sampler2D => wgpu::VertexFormat::Float32,
    }
}

#[must_use]
pub fn format_to_wgsl_type(format: wgpu::VertexFormat) -> &'static str {
    match format {
        wgpu::VertexFormat::Float32x2 => "vec2<f32>",
        wgpu::VertexFormat::Float32x3 => "vec3<f32>",
        wgpu::VertexFormat::Float32x4 => "vec4<f32>",
        _ => "f32",
    }
}

/// Floats per vertex in a stream of `format`.
#[must_use]
pub fn format_components(format: wgpu::VertexFormat) -> usize {
    (format.size() / std::mem::size_of::<f32>() as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_streams_follow_builtins() {
        let layout = VertexLayout::new([("a_Tint", GlType::Vec4), ("a_Weight", GlType::Float)]);
        assert_eq!(layout.buffers.len(), 3);
        assert_eq!(layout.buffers[0].array_stride, 52);
        assert_eq!(layout.buffers[1].attributes[0].location, 5);
        assert_eq!(layout.buffers[2].array_stride, 4);
        let code = layout.vertex_input_code();
        assert!(code.contains("@location(6) a_Weight: f32,"));
        assert!(code.contains("@location(2) a_Color: vec4<f32>,"));
    }
}
