//! Wavefront `.obj` geometry.
//!
//! Supported statements: `v`, `vt`, `vn`, `f` (`v`, `v/vt`, `v//vn`,
//! `v/vt/vn`; 1-based, negative values count back from the latest entry),
//! `g`/`o` (start a new shape), `usemtl`, `mtllib`. `s` and `mg` are accepted
//! and ignored, anything else is skipped with a debug log.

use glam::{Vec2, Vec3};

use crate::assets::io::{AssetReader, resolve_relative};
use crate::assets::mtl::{MaterialLibrary, parse_mtl};
use crate::errors::{Result, TesseraError};
use crate::resources::element::Element;
use crate::resources::material::{DEFAULT_FACE_COLOR, Material};
use crate::resources::vertex::{Vertex, VertexBuilder};
use crate::scene::shape::Shape;

/// Kind name of shapes built from obj documents.
pub const OBJ_SHAPE_KIND: &str = "obj";

/// Splits `text` into trimmed statements, dropping blanks and `#` comments.
///
/// A line ending in `\` continues on the next one. Each statement carries
/// the 1-based number of its first physical line.
#[must_use]
pub fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if pending.is_none() && (line.is_empty() || line.starts_with('#')) {
            continue;
        }
        let (body, continues) = match line.strip_suffix('\\') {
            Some(body) => (body.trim_end(), true),
            None => (line, false),
        };
        let (_, acc) = pending.get_or_insert_with(|| (index + 1, String::new()));
        if !acc.is_empty() && !body.is_empty() {
            acc.push(' ');
        }
        acc.push_str(body);
        if !continues && let Some(done) = pending.take() {
            lines.push(done);
        }
    }
    if let Some(done) = pending {
        lines.push(done);
    }
    lines
}

/// The `mtllib` file named by the document, if any. The last one wins.
#[must_use]
pub fn material_library_name(text: &str) -> Option<String> {
    logical_lines(text)
        .into_iter()
        .filter_map(|(_, line)| line.strip_prefix("mtllib ").map(|rest| rest.trim().to_string()))
        .next_back()
}

#[derive(Debug, Default)]
struct Pools {
    positions: Vec<Vec3>,
    texture_coords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

/// Builds one shape per group of an obj document.
///
/// Vertex data before the first `g`/`o` opens a shape named `default`.
/// Faces take the diffuse colour of the active material, or a neutral grey.
pub fn build_shapes(text: &str, materials: Option<&MaterialLibrary>) -> Result<Vec<Shape>> {
    let mut shapes: Vec<Shape> = Vec::new();
    let mut pools = Pools::default();
    let mut material: Option<&Material> = None;

    for (line_no, line) in logical_lines(text) {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "g" | "o" => shapes.push(new_shape(rest)),
            "v" | "vt" | "vn" => {
                if shapes.is_empty() {
                    shapes.push(new_shape("default"));
                }
                let values = parse_floats(rest, line_no)?;
                match (command, values.as_slice()) {
                    ("v", [x, y, z, ..]) => pools.positions.push(Vec3::new(*x, *y, *z)),
                    ("vn", [x, y, z, ..]) => pools.normals.push(Vec3::new(*x, *y, *z)),
                    ("vt", [s, t, ..]) => pools.texture_coords.push(Vec2::new(*s, *t)),
                    ("vt", [s]) => pools.texture_coords.push(Vec2::new(*s, 0.0)),
                    _ => {
                        return Err(TesseraError::Parse {
                            line: line_no,
                            message: format!("`{command}` is missing components: `{rest}`"),
                        });
                    }
                }
            }
            "f" => {
                let color = material.map_or(DEFAULT_FACE_COLOR, Material::face_color);
                let vertices = rest
                    .split_whitespace()
                    .map(|point| face_vertex(point, &pools, line_no))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .map(|v| v.color(color).build());
                let face = Element::face()
                    .color(color)
                    .vertices(vertices)
                    .build()
                    .map_err(|e| TesseraError::Parse {
                        line: line_no,
                        message: e.to_string(),
                    })?;
                if shapes.is_empty() {
                    shapes.push(new_shape("default"));
                }
                if let Some(shape) = shapes.last_mut() {
                    shape.add_element(face);
                }
            }
            "usemtl" => {
                material = materials.and_then(|library| library.get(rest));
                match material {
                    Some(found) => {
                        if let Some(shape) = shapes.last_mut()
                            && shape.material().is_none()
                        {
                            shape.set_material(found.clone());
                        }
                    }
                    None => log::warn!("line {line_no}: material `{rest}` is not defined"),
                }
            }
            "mtllib" | "s" | "mg" => {}
            other => log::debug!("line {line_no}: unsupported statement `{other}` skipped"),
        }
    }

    Ok(shapes)
}

/// Loads `url` and, when it names one, its material library.
///
/// The library is resolved relative to the obj document and loaded before
/// any face is built.
pub async fn load_obj<R: AssetReader>(reader: &R, url: &str) -> Result<Vec<Shape>> {
    let text = reader.read_string(url).await?;
    let materials = match material_library_name(&text) {
        Some(name) => {
            let mtl_url = resolve_relative(url, &name)?;
            let mtl_text = reader.read_string(&mtl_url).await?;
            Some(parse_mtl(&mtl_text, &mtl_url)?)
        }
        None => None,
    };
    let shapes = build_shapes(&text, materials.as_ref())?;
    log::info!("loaded {} shapes from `{url}`", shapes.len());
    Ok(shapes)
}

fn new_shape(name: &str) -> Shape {
    let shape = Shape::new(OBJ_SHAPE_KIND).with_color(DEFAULT_FACE_COLOR);
    if name.is_empty() { shape } else { shape.with_id(name) }
}

fn parse_floats(text: &str, line: usize) -> Result<Vec<f32>> {
    text.split_whitespace()
        .map(|v| {
            v.parse::<f32>().map_err(|_| TesseraError::Parse {
                line,
                message: format!("expected a number, got `{v}`"),
            })
        })
        .collect()
}

/// Resolves a 1-based (or negative, relative) obj index into `len` entries.
fn resolve_index(raw: &str, len: usize, line: usize) -> Result<usize> {
    let value: i64 = raw.parse().map_err(|_| TesseraError::Parse {
        line,
        message: format!("invalid index `{raw}`"),
    })?;
    let resolved = match value {
        v if v > 0 => v - 1,
        v if v < 0 => len as i64 + v,
        _ => -1,
    };
    if resolved < 0 || resolved as usize >= len {
        return Err(TesseraError::Parse {
            line,
            message: format!("index {value} out of range (1..={len})"),
        });
    }
    Ok(resolved as usize)
}

fn face_vertex(point: &str, pools: &Pools, line: usize) -> Result<VertexBuilder> {
    let mut parts = point.split('/');
    let position = parts
        .next()
        .map(|raw| resolve_index(raw, pools.positions.len(), line))
        .transpose()?
        .ok_or_else(|| TesseraError::Parse {
            line,
            message: format!("empty face vertex `{point}`"),
        })?;
    let mut builder = Vertex::builder(pools.positions[position]);

    if let Some(raw) = parts.next().filter(|raw| !raw.is_empty()) {
        let index = resolve_index(raw, pools.texture_coords.len(), line)?;
        builder = builder.texture(pools.texture_coords[index].to_array());
    }
    if let Some(raw) = parts.next().filter(|raw| !raw.is_empty()) {
        let index = resolve_index(raw, pools.normals.len(), line)?;
        builder = builder.normal(pools.normals[index]);
    }
    Ok(builder)
}
