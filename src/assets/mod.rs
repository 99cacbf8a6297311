//! Asset loading: obj geometry, mtl materials and texture images.
//!
//! Everything here reads through an [`AssetReader`], so the same loaders run
//! against the file system ([`FileAssetReader`]) or in-memory fixtures
//! ([`MemoryAssetReader`]).
//!
//! Textures load independently of the scene that uses them. A finished load
//! is sent over a `flume` channel as a [`TextureLoad`]; the scene drains the
//! channel when it next links or renders. A load that finishes after the
//! receiving scene is gone is dropped silently.

pub mod io;
pub mod mtl;
pub mod obj;

pub use io::{AssetReader, FileAssetReader, MemoryAssetReader, resolve_relative};
pub use mtl::{MaterialLibrary, parse_mtl};
pub use obj::{OBJ_SHAPE_KIND, build_shapes, load_obj, logical_lines, material_library_name};

use image::RgbaImage;

use crate::resources::texture::Texture;

/// Outcome of one texture load.
#[derive(Debug)]
pub struct TextureLoad {
    pub url: String,
    /// Decoded image, or the error text.
    pub result: Result<RgbaImage, String>,
}

/// Reads and decodes the image at `url`, then reports it on `sink`.
pub async fn load_texture<R: AssetReader>(reader: &R, url: &str, sink: flume::Sender<TextureLoad>) {
    let result = match reader.read_bytes(url).await {
        Ok(bytes) => Texture::decode(&bytes).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    if let Err(e) = &result {
        log::warn!("texture `{url}` failed to load: {e}");
    }
    if sink
        .send_async(TextureLoad {
            url: url.to_string(),
            result,
        })
        .await
        .is_err()
    {
        log::debug!("texture `{url}` loaded after its scene was dropped");
    }
}
