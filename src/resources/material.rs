//! Surface materials as described by mtl documents.

use std::collections::BTreeMap;

use crate::resources::vector::Rgba;

/// Face colour used when no material provides a diffuse colour.
pub const DEFAULT_FACE_COLOR: Rgba = Rgba::rgb(0.7, 0.7, 0.7);

/// A texture referenced by a material, with the unit it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureRef {
    pub url: String,
    pub unit: u32,
}

/// One named material block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// `Ka`
    pub ambient: Option<Rgba>,
    /// `Kd`
    pub diffuse: Option<Rgba>,
    /// `Ks`
    pub specular: Option<Rgba>,
    /// `Ns`
    pub shininess: Option<f32>,
    /// `Ni`
    pub optical_density: Option<f32>,
    /// `d`
    pub dissolve: Option<f32>,
    pub illum: Option<u32>,
    /// `map_Kd`
    pub diffuse_map: Option<TextureRef>,
    /// `map_d`
    pub alpha_map: Option<TextureRef>,
    /// Keys the parser does not interpret, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Diffuse colour, or the default grey.
    #[must_use]
    pub fn face_color(&self) -> Rgba {
        self.diffuse.unwrap_or(DEFAULT_FACE_COLOR)
    }

    #[must_use]
    pub fn has_texture(&self) -> bool {
        self.diffuse_map.is_some()
    }

    /// Every texture this material references, diffuse map first.
    pub fn textures(&self) -> impl Iterator<Item = &TextureRef> {
        self.diffuse_map.iter().chain(self.alpha_map.iter())
    }
}
