//! Geometric elements: the vertex runs a shape is assembled from.
//!
//! An [`Element`] is an ordered vertex sequence drawn with one
//! [`RenderMode`]. Vertex order decides winding and connectivity, so it is
//! preserved exactly from construction through index lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TesseraError};
use crate::resources::vector::{Coordinate, Rgba};
use crate::resources::vertex::Vertex;
use crate::resources::vertices_data::VerticesData;

/// Primitive topology of a draw call.
///
/// The declaration order is the order modes are drawn in within one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl RenderMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "POINTS",
            Self::Lines => "LINES",
            Self::LineStrip => "LINE_STRIP",
            Self::LineLoop => "LINE_LOOP",
            Self::Triangles => "TRIANGLES",
            Self::TriangleStrip => "TRIANGLE_STRIP",
            Self::TriangleFan => "TRIANGLE_FAN",
        }
    }

    /// Runs of this mode are stitched with a degenerate join when several
    /// elements share one index buffer.
    #[inline]
    #[must_use]
    pub const fn needs_degenerate_join(self) -> bool {
        matches!(self, Self::TriangleStrip)
    }

    /// Elements of this mode can share one index run. Line strips, loops
    /// and fans cannot be concatenated without connecting unrelated
    /// elements, so each of those elements gets its own run.
    #[inline]
    #[must_use]
    pub const fn merges_runs(self) -> bool {
        matches!(self, Self::Points | Self::Lines | Self::Triangles | Self::TriangleStrip)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "POINTS" => Ok(Self::Points),
            "LINES" => Ok(Self::Lines),
            "LINE_STRIP" => Ok(Self::LineStrip),
            "LINE_LOOP" => Ok(Self::LineLoop),
            "TRIANGLES" => Ok(Self::Triangles),
            "TRIANGLE_STRIP" => Ok(Self::TriangleStrip),
            "TRIANGLE_FAN" | "FAN" => Ok(Self::TriangleFan),
            other => Err(TesseraError::InvalidRenderMode {
                element: "any",
                mode: other.to_string(),
            }),
        }
    }
}

/// Element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Points,
    Lines,
    Triangles,
    /// A planar polygon of at least three vertices.
    Face,
}

impl ElementKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::Triangles => "triangles",
            Self::Face => "face",
        }
    }

    /// Modes this kind may be drawn with.
    #[must_use]
    pub const fn accepted_modes(self) -> &'static [RenderMode] {
        match self {
            Self::Points => &[RenderMode::Points],
            Self::Lines => &[RenderMode::Lines, RenderMode::LineStrip, RenderMode::LineLoop],
            Self::Triangles => &[
                RenderMode::Triangles,
                RenderMode::TriangleStrip,
                RenderMode::TriangleFan,
            ],
            Self::Face => &[RenderMode::Triangles, RenderMode::TriangleStrip],
        }
    }

    const fn default_mode(self) -> RenderMode {
        match self {
            Self::Points => RenderMode::Points,
            Self::Lines => RenderMode::Lines,
            Self::Triangles | Self::Face => RenderMode::Triangles,
        }
    }
}

/// An ordered vertex run with a fixed render mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: String,
    kind: ElementKind,
    mode: RenderMode,
    color: Rgba,
    vertices: Vec<Vertex>,
}

impl Element {
    /// Starts a points element.
    #[must_use]
    pub fn points() -> ElementBuilder {
        ElementBuilder::new(ElementKind::Points)
    }

    /// Starts a lines element (`LINES` unless [`ElementBuilder::mode`] says
    /// otherwise).
    #[must_use]
    pub fn lines() -> ElementBuilder {
        ElementBuilder::new(ElementKind::Lines)
    }

    /// Starts a triangles element.
    #[must_use]
    pub fn triangles() -> ElementBuilder {
        ElementBuilder::new(ElementKind::Triangles)
    }

    /// Starts a face. Its mode is derived from the vertex count at build time.
    #[must_use]
    pub fn face() -> ElementBuilder {
        ElementBuilder::new(ElementKind::Face)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> Rgba {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Indices of this element's vertices in draw order.
    ///
    /// A strip-mode face with more than three vertices swaps its first two
    /// entries (`[1, 0, 2, 3, ...]`) so the first triangle is not lost.
    pub fn indices(&self, store: &mut VerticesData) -> Vec<u32> {
        let mut indices = store.indices_for(&self.vertices);
        if self.kind == ElementKind::Face
            && self.mode == RenderMode::TriangleStrip
            && indices.len() > 3
        {
            indices.swap(0, 1);
        }
        indices
    }

    /// Replaces every vertex with `f(vertex)`, keeping order.
    pub(crate) fn map_vertices(&mut self, f: impl FnMut(&Vertex) -> Vertex) {
        self.vertices = self.vertices.iter().map(f).collect();
    }
}

#[derive(Debug, Clone, Copy)]
enum PendingVertex {
    Coord(Coordinate),
    Full(Vertex),
}

/// Builder for [`Element`].
///
/// Bare coordinates take the element colour (and for points the element
/// size) when the element is built; full vertices are kept as given.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    kind: ElementKind,
    id: Option<String>,
    mode: Option<RenderMode>,
    color: Rgba,
    size: f32,
    pending: Vec<PendingVertex>,
}

impl ElementBuilder {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            mode: None,
            color: Rgba::WHITE,
            size: 1.0,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<Rgba>) -> Self {
        self.color = color.into();
        self
    }

    /// Point size for bare coordinates. Only meaningful for points.
    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn coord(mut self, coord: impl Into<Coordinate>) -> Self {
        self.pending.push(PendingVertex::Coord(coord.into()));
        self
    }

    #[must_use]
    pub fn coords<C: Into<Coordinate>>(mut self, coords: impl IntoIterator<Item = C>) -> Self {
        self.pending
            .extend(coords.into_iter().map(|c| PendingVertex::Coord(c.into())));
        self
    }

    #[must_use]
    pub fn vertex(mut self, vertex: Vertex) -> Self {
        self.pending.push(PendingVertex::Full(vertex));
        self
    }

    #[must_use]
    pub fn vertices(mut self, vertices: impl IntoIterator<Item = Vertex>) -> Self {
        self.pending.extend(vertices.into_iter().map(PendingVertex::Full));
        self
    }

    pub fn build(self) -> Result<Element> {
        let kind = self.kind;
        let mode = match kind {
            ElementKind::Face => {
                if self.pending.len() < 3 {
                    return Err(TesseraError::InsufficientVertices(self.pending.len()));
                }
                if self.pending.len() == 3 {
                    RenderMode::Triangles
                } else {
                    RenderMode::TriangleStrip
                }
            }
            _ => {
                let mode = self.mode.unwrap_or(kind.default_mode());
                if !kind.accepted_modes().contains(&mode) {
                    return Err(TesseraError::InvalidRenderMode {
                        element: kind.as_str(),
                        mode: mode.to_string(),
                    });
                }
                mode
            }
        };

        let color = self.color;
        let size = self.size;
        let vertices = self
            .pending
            .into_iter()
            .map(|pending| match pending {
                PendingVertex::Coord(coord) if kind == ElementKind::Points => {
                    Vertex::builder(coord).color(color).size(size).build()
                }
                PendingVertex::Coord(coord) => Vertex::new(coord, color),
                PendingVertex::Full(vertex) => vertex,
            })
            .collect();

        Ok(Element {
            id: self
                .id
                .unwrap_or_else(|| format!("{}-{}", kind.as_str(), uuid::Uuid::new_v4())),
            kind,
            mode,
            color,
            vertices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_mode_follows_vertex_count() {
        let tri = Element::face()
            .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .build()
            .unwrap();
        assert_eq!(tri.mode(), RenderMode::Triangles);

        let quad = Element::face()
            .coords([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]])
            .build()
            .unwrap();
        assert_eq!(quad.mode(), RenderMode::TriangleStrip);
    }

    #[test]
    fn points_take_element_size() {
        let points = Element::points()
            .size(4.0)
            .coord([0.0, 0.0, 0.0])
            .vertex(Vertex::builder([1.0, 0.0, 0.0]).size(2.0).build())
            .build()
            .unwrap();
        assert_eq!(points.vertices()[0].size(), 4.0);
        assert_eq!(points.vertices()[1].size(), 2.0);
    }

    #[test]
    fn fan_alias_parses() {
        assert_eq!("FAN".parse::<RenderMode>().unwrap(), RenderMode::TriangleFan);
        assert!("QUADS".parse::<RenderMode>().is_err());
    }
}
