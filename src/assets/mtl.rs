//! Material library (`.mtl`) documents.

use rustc_hash::FxHashMap;

use crate::assets::io::resolve_relative;
use crate::assets::obj::logical_lines;
use crate::errors::{Result, TesseraError};
use crate::resources::material::{Material, TextureRef};
use crate::resources::vector::Rgba;

/// Every material of one `.mtl` document.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    pub url: String,
    materials: FxHashMap<String, Material>,
    textures: Vec<TextureRef>,
}

impl MaterialLibrary {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Distinct textures in first-reference order, each with its own unit.
    #[must_use]
    pub fn textures(&self) -> &[TextureRef] {
        &self.textures
    }

    fn texture(&mut self, url: String) -> TextureRef {
        if let Some(existing) = self.textures.iter().find(|t| t.url == url) {
            return existing.clone();
        }
        let texture = TextureRef {
            url,
            unit: self.textures.len() as u32,
        };
        self.textures.push(texture.clone());
        texture
    }
}

/// Parses `text`, resolving texture paths against `url`.
pub fn parse_mtl(text: &str, url: &str) -> Result<MaterialLibrary> {
    let mut library = MaterialLibrary {
        url: url.to_string(),
        ..MaterialLibrary::default()
    };
    let mut current: Option<Material> = None;

    for (line_no, line) in logical_lines(text) {
        let (key, rest) = match line.split_once(char::is_whitespace) {
            Some((key, rest)) => (key, rest.trim()),
            None => (line.as_str(), ""),
        };

        if key == "newmtl" {
            if let Some(done) = current.take() {
                library.materials.insert(done.name.clone(), done);
            }
            current = Some(Material::new(rest));
            continue;
        }

        let Some(material) = current.as_mut() else {
            log::warn!("{url}:{line_no}: `{key}` outside of any material, ignored");
            continue;
        };

        match key {
            "Ka" => material.ambient = Some(parse_color(rest, line_no)?),
            "Kd" => material.diffuse = Some(parse_color(rest, line_no)?),
            "Ks" => material.specular = Some(parse_color(rest, line_no)?),
            "Ns" => material.shininess = Some(parse_scalar(rest, line_no)?),
            "Ni" => material.optical_density = Some(parse_scalar(rest, line_no)?),
            "d" => material.dissolve = Some(parse_scalar(rest, line_no)?),
            "illum" => {
                material.illum = Some(rest.parse().map_err(|_| TesseraError::Parse {
                    line: line_no,
                    message: format!("`illum` expects an integer, got `{rest}`"),
                })?);
            }
            "map_Kd" | "map_d" => {
                let resolved = resolve_relative(url, rest)?;
                let texture = library.texture(resolved);
                if key == "map_Kd" {
                    material.diffuse_map = Some(texture);
                } else {
                    material.alpha_map = Some(texture);
                }
            }
            _ => {
                material.extra.insert(key.to_string(), rest.to_string());
            }
        }
    }

    if let Some(done) = current.take() {
        library.materials.insert(done.name.clone(), done);
    }
    log::debug!("{url}: {} materials, {} textures", library.len(), library.textures.len());
    Ok(library)
}

fn parse_scalar(text: &str, line: usize) -> Result<f32> {
    text.parse().map_err(|_| TesseraError::Parse {
        line,
        message: format!("expected a number, got `{text}`"),
    })
}

fn parse_color(text: &str, line: usize) -> Result<Rgba> {
    let values = text
        .split_whitespace()
        .map(|v| parse_scalar(v, line))
        .collect::<Result<Vec<_>>>()?;
    match values.as_slice() {
        [r, g, b, ..] => Ok(Rgba::rgb(*r, *g, *b)),
        _ => Err(TesseraError::Parse {
            line,
            message: format!("expected an r g b triple, got `{text}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = "\
# two materials
newmtl red
Ka 0.1 0.0 0.0
Kd 1.0 0.0 0.0
Ns 10
illum 2
map_Kd textures/red.png
Tf 1 1 1

newmtl glass
Kd 0.8 0.8 0.9
d 0.25
map_d textures/red.png
map_Kd glass.jpg
";

    #[test]
    fn parses_named_blocks() {
        let library = parse_mtl(LIBRARY, "models/scene.mtl").unwrap();
        assert_eq!(library.len(), 2);

        let red = library.get("red").unwrap();
        assert_eq!(red.diffuse, Some(Rgba::rgb(1.0, 0.0, 0.0)));
        assert_eq!(red.ambient, Some(Rgba::rgb(0.1, 0.0, 0.0)));
        assert_eq!(red.shininess, Some(10.0));
        assert_eq!(red.illum, Some(2));
        assert_eq!(red.extra.get("Tf").map(String::as_str), Some("1 1 1"));

        let glass = library.get("glass").unwrap();
        assert_eq!(glass.dissolve, Some(0.25));
    }

    #[test]
    fn textures_get_units_once_per_url() {
        let library = parse_mtl(LIBRARY, "models/scene.mtl").unwrap();
        let red = library.get("red").unwrap().diffuse_map.clone().unwrap();
        assert_eq!(red.url, "models/textures/red.png");
        assert_eq!(red.unit, 0);

        let glass = library.get("glass").unwrap();
        assert_eq!(glass.alpha_map.as_ref().unwrap().unit, 0);
        assert_eq!(glass.diffuse_map.as_ref().unwrap().unit, 1);
        assert_eq!(library.textures().len(), 2);
    }

    #[test]
    fn malformed_colour_reports_its_line() {
        let err = parse_mtl("newmtl a\nKd 1.0 x 0.0\n", "a.mtl").unwrap_err();
        assert!(matches!(err, TesseraError::Parse { line: 2, .. }));
    }

    #[test]
    fn keys_before_newmtl_are_ignored() {
        let library = parse_mtl("Kd 1 1 1\nnewmtl a\n", "a.mtl").unwrap();
        assert_eq!(library.get("a").unwrap().diffuse, None);
    }
}
