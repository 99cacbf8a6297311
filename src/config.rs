//! Scene and Renderer Configuration
//!
//! [`SceneConfig`] describes a scene's extent and its optional camera, light
//! and ground grid. It is plain serde data and can be loaded from JSON:
//!
//! ```rust,ignore
//! use tessera::config::SceneConfig;
//!
//! let config = SceneConfig::from_json(r#"{
//!     "id": "main", "width": 8, "height": 6, "depth": 20,
//!     "light": { "direction": [0.5, 3.0, 4.0] }
//! }"#)?;
//! ```
//!
//! [`RenderSettings`] configures the wgpu backend.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TesseraError};
use crate::resources::primitives::GridOptions;
use crate::scene::camera::ProjectionType;

/// Extent of a scene along each axis, centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRange {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub background_color: [f32; 4],
    pub camera: Option<CameraConfig>,
    pub light: Option<LightConfig>,
    /// The ground grid. Zero extents take the scene's width and depth.
    pub grid: Option<GridOptions>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            width: 0.0,
            height: 0.0,
            depth: 0.0,
            background_color: [0.0, 0.0, 0.0, 1.0],
            camera: None,
            light: None,
            grid: None,
        }
    }
}

impl SceneConfig {
    #[must_use]
    pub fn new(id: impl Into<String>, width: f32, height: f32, depth: f32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            depth,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.range()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = Some(camera);
        self
    }

    #[must_use]
    pub fn with_light(mut self, light: LightConfig) -> Self {
        self.light = Some(light);
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid: GridOptions) -> Self {
        self.grid = Some(grid);
        self
    }

    #[must_use]
    pub fn with_background(mut self, color: [f32; 4]) -> Self {
        self.background_color = color;
        self
    }

    /// The validated scene extent. A missing id or a non-positive extent is
    /// a [`TesseraError::MissingArgument`].
    pub fn range(&self) -> Result<SceneRange> {
        if self.id.is_empty() {
            return Err(TesseraError::MissingArgument("id"));
        }
        for (name, value) in [("width", self.width), ("height", self.height), ("depth", self.depth)] {
            if value.is_nan() || value <= 0.0 {
                return Err(TesseraError::MissingArgument(name));
            }
        }
        Ok(SceneRange {
            width: self.width,
            height: self.height,
            depth: self.depth,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub id: String,
    pub position: [f32; 3],
    pub looking: [f32; 3],
    pub up: [f32; 3],
    pub near: f32,
    /// Defaults to `depth / 2 + position.z`.
    pub far: Option<f32>,
    pub projection: ProjectionType,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Defaults to `width / height`.
    pub aspect: Option<f32>,
    /// Orthographic bounds; each defaults to half the scene extent.
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub top: Option<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            id: "camera".to_string(),
            position: [0.0, 0.0, 7.0],
            looking: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            near: 0.1,
            far: None,
            projection: ProjectionType::Orthographic,
            fovy: 30.0,
            aspect: None,
            left: None,
            right: None,
            bottom: None,
            top: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub id: String,
    pub color: [f32; 4],
    pub ambient: [f32; 4],
    pub direction: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            id: "light".to_string(),
            color: [1.0, 1.0, 1.0, 1.0],
            ambient: [0.2, 0.2, 0.2, 1.0],
            direction: [0.0, 0.0, 1.0],
        }
    }
}

/// Offscreen wgpu backend settings.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub power_preference: wgpu::PowerPreference,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Used when a frame is cleared without an explicit colour.
    pub clear_color: wgpu::Color,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            depth_format: wgpu::TextureFormat::Depth32Float,
            clear_color: wgpu::Color::BLACK,
            width: 800,
            height: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_extent_is_reported_by_name() {
        let err = SceneConfig::from_json(r#"{ "id": "s", "width": 4, "height": 3 }"#).unwrap_err();
        assert!(matches!(err, TesseraError::MissingArgument("depth")));
    }

    #[test]
    fn nested_defaults_are_filled() {
        let config = SceneConfig::from_json(
            r#"{ "id": "s", "width": 4, "height": 3, "depth": 10,
                 "camera": { "projection": "perspective" } }"#,
        )
        .unwrap();
        let camera = config.camera.unwrap();
        assert_eq!(camera.position, [0.0, 0.0, 7.0]);
        assert_eq!(camera.projection, ProjectionType::Perspective);
        assert!((camera.fovy - 30.0).abs() < f32::EPSILON);
    }
}
