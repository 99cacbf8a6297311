use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::resources::element::Element;
use crate::resources::vector::Rgba;
use crate::resources::vertex::Vertex;
use crate::scene::shape::{Shape, ShapeFlags};

/// Ground grid options. Extents default to the scene range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub unit_distance: f32,
    pub width: f32,
    pub depth: f32,
    pub color: [f32; 3],
    /// Colour of every tenth line.
    pub deepened_color: [f32; 3],
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            unit_distance: 1.0,
            width: 0.0,
            depth: 0.0,
            color: [0.8, 0.8, 0.8],
            deepened_color: [0.6, 0.6, 0.6],
        }
    }
}

/// Line pairs on the XZ plane, centred on the origin, every tenth line
/// (counting outwards from the axes) in the deepened colour.
///
/// The grid is flagged [`ShapeFlags::UNLIT`].
pub fn create_grid(options: &GridOptions) -> Result<Shape> {
    let unit = if options.unit_distance > 0.0 { options.unit_distance } else { 1.0 };
    let x_count = options.width / 2.0 / unit;
    let z_count = options.depth / 2.0 / unit;
    let x_edge = x_count * unit;
    let z_edge = z_count * unit;
    let plain = Rgba::from(options.color);
    let deep = Rgba::from(options.deepened_color);
    let pick = |i: u32| if i % 10 == 0 { deep } else { plain };

    let mut vertices = Vec::new();
    let mut i = 0u32;
    while (i as f32) < x_count {
        let x = i as f32 * unit;
        let color = pick(i);
        vertices.push(Vertex::new([x, 0.0, -z_edge], color));
        vertices.push(Vertex::new([x, 0.0, z_edge], color));
        if i > 0 {
            vertices.push(Vertex::new([-x, 0.0, -z_edge], color));
            vertices.push(Vertex::new([-x, 0.0, z_edge], color));
        }
        i += 1;
    }
    let mut i = 0u32;
    while (i as f32) < z_count {
        let z = i as f32 * unit;
        let color = pick(i);
        vertices.push(Vertex::new([-x_edge, 0.0, z], color));
        vertices.push(Vertex::new([x_edge, 0.0, z], color));
        if i > 0 {
            vertices.push(Vertex::new([-x_edge, 0.0, -z], color));
            vertices.push(Vertex::new([x_edge, 0.0, -z], color));
        }
        i += 1;
    }

    let lines = Element::lines().color(plain).vertices(vertices).build()?;
    let mut shape = Shape::new("grid")
        .with_color(plain)
        .with_flags(ShapeFlags::UNLIT);
    shape.add_element(lines);
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenth_lines_are_deepened() {
        let grid = create_grid(&GridOptions {
            width: 24.0,
            depth: 2.0,
            ..GridOptions::default()
        })
        .unwrap();
        let lines = &grid.elements()[0];
        // x = 0 and x = +-10 use the deepened colour
        let deep = Rgba::from([0.6, 0.6, 0.6]);
        let deep_count = lines
            .vertices()
            .iter()
            .filter(|v| v.color() == deep && v.coord().z().abs() == 1.0)
            .count();
        assert_eq!(deep_count, 2 + 4 + 2);
        assert!(grid.is_unlit());
    }
}
