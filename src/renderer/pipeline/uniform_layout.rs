//! Generic uniform block layout.
//!
//! Fields follow WGSL uniform address space rules: `f32` aligns to 4,
//! `vec2` to 8, `vec3`/`vec4`/`mat4x4` to 16, and the block size is rounded
//! up to 16.

use crate::resources::variable_set::GlType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformField {
    pub name: String,
    pub gl_type: GlType,
    /// Byte offset.
    pub offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    size: usize,
}

const fn align_size(ty: GlType) -> (usize, usize) {
    match ty {
        GlType::Bool | GlType::Float | GlType::Sampler2D => (4, 4),
        GlType::Vec2 => (8, 8),
        GlType::Vec3 => (16, 12),
        GlType::Vec4 => (16, 16),
        GlType::Mat4 => (16, 64),
    }
}

impl UniformLayout {
    #[must_use]
    pub fn new<'a>(fields: impl IntoIterator<Item = (&'a str, GlType)>) -> Self {
        let mut layout = Self::default();
        let mut cursor = 0usize;
        for (name, gl_type) in fields {
            let (align, size) = align_size(gl_type);
            let offset = cursor.next_multiple_of(align);
            layout.fields.push(UniformField {
                name: name.to_string(),
                gl_type,
                offset,
            });
            cursor = offset + size;
        }
        layout.size = cursor.next_multiple_of(16);
        layout
    }

    #[must_use]
    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Block size in bytes. Zero when there are no fields.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Packs `values` into the block. Fields without a value are filled
    /// with `1.0`; extra values are ignored.
    #[must_use]
    pub fn pack(&self, values: &[(String, Vec<f32>)]) -> Vec<u8> {
        let mut block = vec![0.0f32; self.size / 4];
        for field in &self.fields {
            let count = field.gl_type.components();
            let start = field.offset / 4;
            let slot = &mut block[start..start + count];
            match values.iter().find(|(name, _)| *name == field.name) {
                Some((_, value)) => {
                    for (dst, src) in slot.iter_mut().zip(value.iter().chain(std::iter::repeat(&1.0))) {
                        *dst = *src;
                    }
                }
                None => {
                    log::warn!("uniform `{}` has no value, filling with 1.0", field.name);
                    slot.fill(1.0);
                }
            }
        }
        bytemuck::cast_slice(&block).to_vec()
    }
}
