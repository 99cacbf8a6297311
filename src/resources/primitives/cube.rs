use std::str::FromStr;

use crate::errors::{Result, TesseraError};
use crate::resources::element::Element;
use crate::resources::vector::Rgba;
use crate::resources::vertex::Vertex;
use crate::scene::shape::Shape;

/// Where the local origin (the rotation pivot) sits inside the cube, one
/// choice per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeAnchor {
    /// Along the length (x): left, center or right.
    pub x: AnchorX,
    /// Along the height (y): top, middle or bottom.
    pub y: AnchorY,
    /// Along the width (z): near, among or far.
    pub z: AnchorZ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorX {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorY {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorZ {
    Near,
    #[default]
    Among,
    Far,
}

impl Default for CubeAnchor {
    fn default() -> Self {
        Self {
            x: AnchorX::Center,
            y: AnchorY::Middle,
            z: AnchorZ::Among,
        }
    }
}

impl FromStr for CubeAnchor {
    type Err = TesseraError;

    /// Accepts `"left/top/near"` style word lists or letter strings such as
    /// `"ltn"`, in any order. Axes not mentioned keep their default.
    fn from_str(s: &str) -> Result<Self> {
        let mut anchor = Self::default();
        let apply = |anchor: &mut Self, token: &str| -> Result<()> {
            match token {
                "left" | "l" => anchor.x = AnchorX::Left,
                "center" | "c" => anchor.x = AnchorX::Center,
                "right" | "r" => anchor.x = AnchorX::Right,
                "top" | "t" => anchor.y = AnchorY::Top,
                "middle" | "m" => anchor.y = AnchorY::Middle,
                "bottom" | "b" => anchor.y = AnchorY::Bottom,
                "near" | "n" => anchor.z = AnchorZ::Near,
                "among" | "a" => anchor.z = AnchorZ::Among,
                "far" | "f" => anchor.z = AnchorZ::Far,
                other => {
                    return Err(TesseraError::InvalidOption(format!(
                        "unknown cube anchor `{other}`"
                    )));
                }
            }
            Ok(())
        };

        if s.contains('/') {
            for token in s.split('/') {
                apply(&mut anchor, token.trim())?;
            }
        } else {
            let mut buf = [0u8; 4];
            for c in s.chars() {
                apply(&mut anchor, c.encode_utf8(&mut buf))?;
            }
        }
        Ok(anchor)
    }
}

/// Optional per-face colours; unset faces use the cube colour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceColors {
    pub front: Option<Rgba>,
    pub back: Option<Rgba>,
    pub left: Option<Rgba>,
    pub right: Option<Rgba>,
    pub top: Option<Rgba>,
    pub bottom: Option<Rgba>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeOptions {
    /// Extent along x.
    pub length: f32,
    /// Extent along z.
    pub width: f32,
    /// Extent along y.
    pub height: f32,
    pub color: Rgba,
    pub face_colors: FaceColors,
    pub anchor: CubeAnchor,
    pub position: [f32; 3],
}

impl Default for CubeOptions {
    fn default() -> Self {
        Self {
            length: 1.0,
            width: 1.0,
            height: 1.0,
            color: Rgba::WHITE,
            face_colors: FaceColors::default(),
            anchor: CubeAnchor::default(),
            position: [0.0; 3],
        }
    }
}

/// A box of six four-vertex faces.
///
/// Corners are not shared between faces because each face carries its own
/// normal, so the cube always stores 24 unique vertices.
pub fn create_cube(options: &CubeOptions) -> Result<Shape> {
    let (left, right) = match options.anchor.x {
        AnchorX::Left => (0.0, options.length),
        AnchorX::Center => (-options.length / 2.0, options.length / 2.0),
        AnchorX::Right => (-options.length, 0.0),
    };
    let (top, bottom) = match options.anchor.y {
        AnchorY::Top => (0.0, -options.height),
        AnchorY::Middle => (options.height / 2.0, -options.height / 2.0),
        AnchorY::Bottom => (options.height, 0.0),
    };
    let (near, far) = match options.anchor.z {
        AnchorZ::Near => (0.0, -options.width),
        AnchorZ::Among => (options.width / 2.0, -options.width / 2.0),
        AnchorZ::Far => (options.width, 0.0),
    };

    let colors = options.face_colors;
    let base = options.color;
    let face = |color: Option<Rgba>, normal: [f32; 3], corners: [[f32; 3]; 4]| {
        let color = color.unwrap_or(base);
        Element::face()
            .color(color)
            .vertices(
                corners
                    .into_iter()
                    .map(|c| Vertex::builder(c).color(color).normal(normal).build()),
            )
            .build()
    };

    let faces = [
        face(
            colors.front,
            [0.0, 0.0, 1.0],
            [[right, top, near], [left, top, near], [left, bottom, near], [right, bottom, near]],
        )?,
        face(
            colors.right,
            [1.0, 0.0, 0.0],
            [[right, top, near], [right, bottom, near], [right, bottom, far], [right, top, far]],
        )?,
        face(
            colors.top,
            [0.0, 1.0, 0.0],
            [[right, top, near], [right, top, far], [left, top, far], [left, top, near]],
        )?,
        face(
            colors.back,
            [0.0, 0.0, -1.0],
            [[left, bottom, far], [right, bottom, far], [right, top, far], [left, top, far]],
        )?,
        face(
            colors.left,
            [-1.0, 0.0, 0.0],
            [[left, bottom, far], [left, top, far], [left, top, near], [left, bottom, near]],
        )?,
        face(
            colors.bottom,
            [0.0, -1.0, 0.0],
            [[left, bottom, far], [left, bottom, near], [right, bottom, near], [right, bottom, far]],
        )?,
    ];

    let mut shape = Shape::new("cube")
        .with_color(base)
        .with_position(options.position);
    shape.add_elements(faces);
    Ok(shape)
}
