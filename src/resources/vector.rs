//! Vector and colour primitives.
//!
//! Thin value types over `glam` vectors that add the two things the geometry
//! pipeline needs on top of plain math: named component access for the domain
//! (`x/y/z`, `r/g/b/a`, `s/t`) and a stable identity key used by the vertex
//! deduplication cache.
//!
//! Equality is exact component comparison. Identity keys are built from the
//! IEEE bit patterns of the components with `-0.0` folded onto `0.0`, so two
//! values have the same key exactly when they compare equal.

use glam::{Vec2, Vec3, Vec4};

/// Bit pattern used for identity keys. `-0.0` and `0.0` share a key.
#[inline]
#[must_use]
pub fn key_bits(v: f32) -> u32 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

/// Common behaviour of the fixed-arity value types.
pub trait Components {
    /// Number of scalar components.
    const ARITY: usize;

    /// Appends the components in declaration order.
    fn write_values(&self, out: &mut Vec<f32>);

    /// Appends the identity bits in declaration order.
    fn write_key(&self, out: &mut Vec<u32>);

    /// Flattened component values.
    fn values(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(Self::ARITY);
        self.write_values(&mut out);
        out
    }
}

impl Components for Vec2 {
    const ARITY: usize = 2;

    fn write_values(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.to_array());
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        out.extend(self.to_array().map(key_bits));
    }
}

impl Components for Vec3 {
    const ARITY: usize = 3;

    fn write_values(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.to_array());
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        out.extend(self.to_array().map(key_bits));
    }
}

impl Components for Vec4 {
    const ARITY: usize = 4;

    fn write_values(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.to_array());
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        out.extend(self.to_array().map(key_bits));
    }
}

// ============================================================================
// Coordinate
// ============================================================================

/// A position in local space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate(pub Vec3);

impl Coordinate {
    pub const ORIGIN: Self = Self(Vec3::ZERO);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    #[inline]
    #[must_use]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[inline]
    #[must_use]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    #[inline]
    #[must_use]
    pub fn z(&self) -> f32 {
        self.0.z
    }

    #[inline]
    #[must_use]
    pub fn as_vec3(&self) -> Vec3 {
        self.0
    }
}

impl From<[f32; 3]> for Coordinate {
    fn from(v: [f32; 3]) -> Self {
        Self(Vec3::from_array(v))
    }
}

impl From<Vec3> for Coordinate {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl Components for Coordinate {
    const ARITY: usize = 3;

    fn write_values(&self, out: &mut Vec<f32>) {
        self.0.write_values(out);
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        self.0.write_key(out);
    }
}

// ============================================================================
// Rgba
// ============================================================================

/// A linear RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba(pub Vec4);

impl Rgba {
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0, 1.0);
    pub const PURPLE: Self = Self::new(1.0, 0.0, 1.0, 1.0);
    pub const CYAN: Self = Self::new(0.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self(Vec4::new(r, g, b, a))
    }

    /// Opaque colour from three channels.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    #[must_use]
    pub fn r(&self) -> f32 {
        self.0.x
    }

    #[inline]
    #[must_use]
    pub fn g(&self) -> f32 {
        self.0.y
    }

    #[inline]
    #[must_use]
    pub fn b(&self) -> f32 {
        self.0.z
    }

    #[inline]
    #[must_use]
    pub fn a(&self) -> f32 {
        self.0.w
    }

    #[inline]
    #[must_use]
    pub fn as_vec4(&self) -> Vec4 {
        self.0
    }

    #[must_use]
    pub fn to_array(&self) -> [f32; 4] {
        self.0.to_array()
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(v: [f32; 4]) -> Self {
        Self(Vec4::from_array(v))
    }
}

impl From<[f32; 3]> for Rgba {
    fn from(v: [f32; 3]) -> Self {
        Self::rgb(v[0], v[1], v[2])
    }
}

impl Components for Rgba {
    const ARITY: usize = 4;

    fn write_values(&self, out: &mut Vec<f32>) {
        self.0.write_values(out);
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        self.0.write_key(out);
    }
}

// ============================================================================
// Normal
// ============================================================================

/// A surface normal. Always unit length after construction or mutation,
/// except for the zero vector which stays zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal(Vec3);

impl Normal {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self::from(Vec3::new(x, y, z))
    }

    #[inline]
    #[must_use]
    pub fn as_vec3(&self) -> Vec3 {
        self.0
    }

    pub fn set(&mut self, v: Vec3) {
        self.0 = v.normalize_or_zero();
    }
}

impl Default for Normal {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl From<Vec3> for Normal {
    fn from(v: Vec3) -> Self {
        Self(v.normalize_or_zero())
    }
}

impl From<[f32; 3]> for Normal {
    fn from(v: [f32; 3]) -> Self {
        Self::from(Vec3::from_array(v))
    }
}

impl Components for Normal {
    const ARITY: usize = 3;

    fn write_values(&self, out: &mut Vec<f32>) {
        self.0.write_values(out);
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        self.0.write_key(out);
    }
}

// ============================================================================
// TextureCoord
// ============================================================================

/// Texture coordinate in `st` space. `(-1, -1)` marks "no texture".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureCoord(pub Vec2);

impl TextureCoord {
    pub const NONE: Self = Self(Vec2::new(-1.0, -1.0));

    #[must_use]
    pub const fn new(s: f32, t: f32) -> Self {
        Self(Vec2::new(s, t))
    }

    #[inline]
    #[must_use]
    pub fn s(&self) -> f32 {
        self.0.x
    }

    #[inline]
    #[must_use]
    pub fn t(&self) -> f32 {
        self.0.y
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl Default for TextureCoord {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<[f32; 2]> for TextureCoord {
    fn from(v: [f32; 2]) -> Self {
        Self(Vec2::from_array(v))
    }
}

impl Components for TextureCoord {
    const ARITY: usize = 2;

    fn write_values(&self, out: &mut Vec<f32>) {
        self.0.write_values(out);
    }

    fn write_key(&self, out: &mut Vec<u32>) {
        self.0.write_key(out);
    }
}
