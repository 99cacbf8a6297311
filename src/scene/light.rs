use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::config::LightConfig;
use crate::resources::vector::Rgba;
use crate::resources::version_tracker::ChangeTracker;

/// A directional light with an ambient term.
#[derive(Debug, Clone)]
pub struct Light {
    pub id: String,
    color: Rgba,
    ambient: Rgba,
    direction: Vec3,
    tracker: ChangeTracker,
}

/// GPU layout of a light: xyz + padding for each field.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub ambient: [f32; 4],
}

impl Light {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(&LightConfig {
            id: id.into(),
            ..LightConfig::default()
        })
    }

    #[must_use]
    pub fn from_config(config: &LightConfig) -> Self {
        Self {
            id: config.id.clone(),
            color: Rgba::from(config.color),
            ambient: Rgba::from(config.ambient),
            direction: Vec3::from(config.direction).normalize_or_zero(),
            tracker: ChangeTracker::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> Rgba {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn ambient(&self) -> Rgba {
        self.ambient
    }

    /// Unit vector pointing towards the light.
    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_color(&mut self, color: impl Into<Rgba>) {
        self.color = color.into();
        self.tracker.changed();
    }

    pub fn set_ambient(&mut self, ambient: impl Into<Rgba>) {
        self.ambient = ambient.into();
        self.tracker.changed();
    }

    pub fn set_direction(&mut self, direction: impl Into<Vec3>) {
        self.direction = direction.into().normalize_or_zero();
        self.tracker.changed();
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.tracker.version()
    }

    /// Lambert shading on the CPU: `color * light * max(n·l, 0) + ambient * color`
    /// per vertex, keeping each input alpha.
    #[must_use]
    pub fn calculate_colors(&self, normals: &[Vec3], colors: &[Rgba]) -> Vec<Rgba> {
        let light = self.color.as_vec4().truncate();
        let ambient = self.ambient.as_vec4().truncate();
        normals
            .iter()
            .zip(colors)
            .map(|(normal, color)| {
                let base = color.as_vec4().truncate();
                let dot = normal.normalize_or_zero().dot(self.direction).max(0.0);
                let lit = base * light * dot + ambient * base;
                Rgba(Vec4::new(lit.x, lit.y, lit.z, color.a()))
            })
            .collect()
    }

    #[must_use]
    pub fn uniform(&self) -> LightUniform {
        LightUniform {
            direction: self.direction.extend(0.0).to_array(),
            color: self.color.to_array(),
            ambient: self.ambient.to_array(),
        }
    }
}

impl LightUniform {
    /// A light that contributes nothing, for programs without lighting.
    pub const NONE: Self = Self {
        direction: [0.0; 4],
        color: [0.0; 4],
        ambient: [0.0; 4],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_normal_gets_full_diffuse_plus_ambient() {
        let light = Light::new("l");
        let colors = light.calculate_colors(
            &[Vec3::Z, -Vec3::Z],
            &[Rgba::new(0.5, 0.5, 0.5, 0.3), Rgba::new(0.5, 0.5, 0.5, 1.0)],
        );
        assert!((colors[0].r() - 0.6).abs() < 1e-6);
        assert!((colors[0].a() - 0.3).abs() < 1e-6);
        assert!((colors[1].r() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn direction_is_normalised() {
        let mut light = Light::new("l");
        light.set_direction([0.0, 3.0, 4.0]);
        assert!((light.direction().length() - 1.0).abs() < 1e-6);
    }
}
