//! Shapes wrapping a single element.

use crate::errors::Result;
use crate::resources::element::{Element, RenderMode};
use crate::resources::vector::{Coordinate, Rgba};
use crate::resources::vertex::Vertex;
use crate::scene::shape::{BaseType, Shape};

/// Point sprites drawn with the `point` program family.
pub fn create_points(vertices: impl IntoIterator<Item = Vertex>, color: Rgba) -> Result<Shape> {
    let points = Element::points().color(color).vertices(vertices).build()?;
    let mut shape = Shape::new("points").with_base(BaseType::Point).with_color(color);
    shape.add_element(points);
    Ok(shape)
}

/// Points of one size and colour at each coordinate.
pub fn create_points_at<C: Into<Coordinate>>(
    coords: impl IntoIterator<Item = C>,
    color: Rgba,
    size: f32,
) -> Result<Shape> {
    let points = Element::points().color(color).size(size).coords(coords).build()?;
    let mut shape = Shape::new("points").with_base(BaseType::Point).with_color(color);
    shape.add_element(points);
    Ok(shape)
}

/// `LINES`, `LINE_STRIP` or `LINE_LOOP`.
pub fn create_lines<C: Into<Coordinate>>(
    coords: impl IntoIterator<Item = C>,
    mode: RenderMode,
    color: Rgba,
) -> Result<Shape> {
    let lines = Element::lines().mode(mode).color(color).coords(coords).build()?;
    let mut shape = Shape::new("lines").with_color(color);
    shape.add_element(lines);
    Ok(shape)
}

/// `TRIANGLES`, `TRIANGLE_STRIP` or `TRIANGLE_FAN`.
pub fn create_triangles(
    vertices: impl IntoIterator<Item = Vertex>,
    mode: RenderMode,
    color: Rgba,
) -> Result<Shape> {
    let triangles = Element::triangles().mode(mode).color(color).vertices(vertices).build()?;
    let mut shape = Shape::new("triangles").with_color(color);
    shape.add_element(triangles);
    Ok(shape)
}
