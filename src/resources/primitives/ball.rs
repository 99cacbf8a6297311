use std::f32::consts::PI;

use glam::Vec3;

use crate::errors::Result;
use crate::resources::element::Element;
use crate::resources::vector::Rgba;
use crate::resources::vertex::Vertex;
use crate::scene::shape::Shape;

#[derive(Debug, Clone, PartialEq)]
pub struct BallOptions {
    pub radius: f32,
    /// Segments around the pole axis.
    pub u_segments: u32,
    /// Segments from pole to pole.
    pub v_segments: u32,
    pub color: Rgba,
    pub position: [f32; 3],
}

impl Default for BallOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            u_segments: 32,
            v_segments: 16,
            color: Rgba::WHITE,
            position: [0.0; 3],
        }
    }
}

/// Point on the unit sphere at `(u, v)`, `u` around the y axis and `v` from
/// the north pole (`0`) to the south pole (`1`).
fn sphere_point(u: f32, v: f32) -> Vec3 {
    let ring = (PI * v).sin();
    Vec3::new(
        ring * (2.0 * PI * u).cos(),
        (PI * v).cos(),
        ring * (2.0 * PI * u).sin(),
    )
}

/// A UV sphere made of faces: triangles at the caps, quads in between.
pub fn create_ball(options: &BallOptions) -> Result<Shape> {
    let u_count = options.u_segments.max(3);
    let v_count = options.v_segments.max(2);
    let du = 1.0 / u_count as f32;
    let dv = 1.0 / v_count as f32;
    let radius = options.radius;
    let color = options.color;

    let vertex = |u: f32, v: f32| {
        let p = sphere_point(u, v);
        Vertex::builder(p * radius).color(color).normal(p).build()
    };

    let mut faces = Vec::with_capacity((u_count * v_count) as usize);
    for i in 0..u_count {
        let u = i as f32 * du;
        faces.push(
            Element::face()
                .color(color)
                .vertices([vertex(0.0, 0.0), vertex(u, dv), vertex(u + du, dv)])
                .build()?,
        );
    }
    for j in 1..v_count - 1 {
        let v = j as f32 * dv;
        for i in 0..u_count {
            let u = i as f32 * du;
            faces.push(
                Element::face()
                    .color(color)
                    .vertices([
                        vertex(u, v),
                        vertex(u + du, v),
                        vertex(u + du, v + dv),
                        vertex(u, v + dv),
                    ])
                    .build()?,
            );
        }
    }
    for i in 0..u_count {
        let u = i as f32 * du;
        faces.push(
            Element::face()
                .color(color)
                .vertices([vertex(0.0, 1.0), vertex(u, 1.0 - dv), vertex(u + du, 1.0 - dv)])
                .build()?,
        );
    }

    let mut shape = Shape::new("ball")
        .with_color(color)
        .with_position(options.position);
    shape.add_elements(faces);
    Ok(shape)
}
