use image::RgbaImage;

use crate::errors::Result;
use crate::resources::version_tracker::ChangeTracker;

// ============================================================================
// Texture
// ============================================================================

/// An image-backed texture bound to one texture unit.
///
/// The image arrives asynchronously; until then the texture is registered
/// but not drawable. Rows are stored bottom-up so `t = 0` samples the bottom
/// of the source picture.
#[derive(Debug, Clone)]
pub struct Texture {
    url: String,
    unit: u32,
    image: Option<RgbaImage>,
    tracker: ChangeTracker,
}

impl Texture {
    #[must_use]
    pub fn new(url: impl Into<String>, unit: u32) -> Self {
        Self {
            url: url.into(),
            unit,
            image: None,
            tracker: ChangeTracker::new(),
        }
    }

    /// Decodes an encoded image (png or jpeg) and flips it vertically.
    pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(image::imageops::flip_vertical(&decoded.to_rgba8()))
    }

    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    #[must_use]
    pub fn unit(&self) -> u32 {
        self.unit
    }

    #[inline]
    #[must_use]
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    pub fn set_image(&mut self, image: RgbaImage) {
        log::debug!(
            "texture `{}` loaded ({}x{})",
            self.url,
            image.width(),
            image.height()
        );
        self.image = Some(image);
        self.tracker.changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_image_marks_loaded() {
        let mut texture = Texture::new("crate.png", 0);
        assert!(!texture.is_loaded());
        let v = texture.version();
        texture.set_image(RgbaImage::new(2, 2));
        assert!(texture.is_loaded());
        assert_ne!(texture.version(), v);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Texture::decode(b"not an image").is_err());
    }
}
