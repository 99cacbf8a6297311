use crate::errors::Result;
use crate::resources::element::{Element, RenderMode};
use crate::resources::vector::{Coordinate, Rgba};
use crate::scene::shape::Shape;

/// A convex polygon drawn as one triangle fan, first vertex at the hub.
pub fn create_polygon<C: Into<Coordinate>>(
    vertices: impl IntoIterator<Item = C>,
    color: Rgba,
) -> Result<Shape> {
    let fan = Element::triangles()
        .mode(RenderMode::TriangleFan)
        .color(color)
        .coords(vertices)
        .build()?;
    let mut shape = Shape::new("polygon").with_color(color);
    shape.add_element(fan);
    Ok(shape)
}
