use std::fmt;

use crate::resources::vector::{Components, Coordinate, Normal, Rgba, TextureCoord, key_bits};

/// Number of `f32` values stored per vertex in the shared vertex buffer.
pub const VERTEX_STRIDE: usize = 13;

/// Offsets (in floats) of each field inside one vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFieldOffsets {
    pub coord: usize,
    pub size: usize,
    pub color: usize,
    pub normal: usize,
    pub texture: usize,
}

/// The fixed record layout: coord 3, size 1, colour 4, normal 3, texture 2.
pub const VERTEX_OFFSETS: VertexFieldOffsets = VertexFieldOffsets {
    coord: 0,
    size: 3,
    color: 4,
    normal: 8,
    texture: 10,
};

/// Identity of a vertex value.
///
/// Holds the bit patterns of all thirteen components in record order, so two
/// keys are equal exactly when the vertices compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey([u32; VERTEX_STRIDE]);

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.0.map(f32::from_bits);
        let join = |range: std::ops::Range<usize>| {
            values[range]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(
            f,
            "{}-{}-{}-{}-{}",
            join(0..3),
            join(3..4),
            join(4..8),
            join(8..11),
            join(11..13)
        )
    }
}

/// A single vertex: position, point size, colour, normal and texture coordinate.
///
/// Vertices are immutable once built. The dedup cache keys them by value, so
/// changing a field after insertion would desynchronise the cached buffer;
/// build a new vertex instead (see [`Vertex::to_builder`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    coord: Coordinate,
    size: f32,
    color: Rgba,
    normal: Normal,
    texture: TextureCoord,
}

impl Vertex {
    /// Starts a builder with every field except the position at its default.
    #[must_use]
    pub fn builder(coord: impl Into<Coordinate>) -> VertexBuilder {
        VertexBuilder {
            coord: coord.into(),
            size: 1.0,
            color: Rgba::WHITE,
            normal: Normal::default(),
            texture: TextureCoord::NONE,
        }
    }

    /// Shorthand for a coloured vertex with default size, normal and texture.
    #[must_use]
    pub fn new(coord: impl Into<Coordinate>, color: Rgba) -> Self {
        Self::builder(coord).color(color).build()
    }

    /// Builder pre-filled with this vertex's values.
    #[must_use]
    pub fn to_builder(&self) -> VertexBuilder {
        VertexBuilder {
            coord: self.coord,
            size: self.size,
            color: self.color,
            normal: self.normal,
            texture: self.texture,
        }
    }

    #[inline]
    #[must_use]
    pub fn coord(&self) -> Coordinate {
        self.coord
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> Rgba {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn normal(&self) -> Normal {
        self.normal
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> TextureCoord {
        self.texture
    }

    /// Stable identity key built from every component.
    #[must_use]
    pub fn key(&self) -> VertexKey {
        let mut bits = Vec::with_capacity(VERTEX_STRIDE);
        self.coord.write_key(&mut bits);
        bits.push(key_bits(self.size));
        self.color.write_key(&mut bits);
        self.normal.write_key(&mut bits);
        self.texture.write_key(&mut bits);

        let mut key = [0u32; VERTEX_STRIDE];
        key.copy_from_slice(&bits);
        VertexKey(key)
    }

    /// Appends the flattened record (coord, size, colour, normal, texture).
    pub fn write_values(&self, out: &mut Vec<f32>) {
        self.coord.write_values(out);
        out.push(self.size);
        self.color.write_values(out);
        self.normal.write_values(out);
        self.texture.write_values(out);
    }

    /// The flattened record as a fixed array.
    #[must_use]
    pub fn values(&self) -> [f32; VERTEX_STRIDE] {
        let mut out = Vec::with_capacity(VERTEX_STRIDE);
        self.write_values(&mut out);
        let mut values = [0.0; VERTEX_STRIDE];
        values.copy_from_slice(&out);
        values
    }
}

/// Builder for [`Vertex`].
#[derive(Debug, Clone, Copy)]
pub struct VertexBuilder {
    coord: Coordinate,
    size: f32,
    color: Rgba,
    normal: Normal,
    texture: TextureCoord,
}

impl VertexBuilder {
    #[must_use]
    pub fn coord(mut self, coord: impl Into<Coordinate>) -> Self {
        self.coord = coord.into();
        self
    }

    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<Rgba>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn normal(mut self, normal: impl Into<Normal>) -> Self {
        self.normal = normal.into();
        self
    }

    #[must_use]
    pub fn texture(mut self, texture: impl Into<TextureCoord>) -> Self {
        self.texture = texture.into();
        self
    }

    #[must_use]
    pub fn build(self) -> Vertex {
        Vertex {
            coord: self.coord,
            size: self.size,
            color: self.color,
            normal: self.normal,
            texture: self.texture,
        }
    }
}
