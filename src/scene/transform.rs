use glam::{Affine3A, Mat4, Quat, Vec3};

/// An animation-driven TRS layer stacked on top of a [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Overlay {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };
}

impl Default for Overlay {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transform component
///
/// Holds the local translation, rotation and scale of a shape plus any
/// animation overlays, with a cached local matrix and a shadow-state dirty
/// check.
///
/// # Composition order
///
/// Scale is applied first, then rotation, then translation: the local
/// matrix is `T * R * S`. Overlays are folded in component-wise after the
/// base values, in insertion order (translations add, rotations compose,
/// scales multiply), so an animation never changes the application order.
///
/// The world matrix is not stored here; the scene computes it on demand by
/// folding the parent chain (`parent_world * local`).
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    overlays: Vec<(String, Overlay)>,

    local_matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            overlays: Vec::new(),

            local_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: false,
        }
    }

    /// A transform that only translates.
    #[must_use]
    pub fn from_translation(position: Vec3) -> Self {
        let mut transform = Self::new();
        transform.translate(position);
        transform
    }

    // ========================================================================
    // Cumulative operations
    // ========================================================================

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position += delta;
        self
    }

    /// Rotates by `rad` around `axis` in the local frame.
    pub fn rotate(&mut self, rad: f32, axis: Vec3) -> &mut Self {
        let axis = axis.normalize_or_zero();
        if axis != Vec3::ZERO && rad != 0.0 {
            self.rotation = (self.rotation * Quat::from_axis_angle(axis, rad)).normalize();
        }
        self
    }

    pub fn rotate_x(&mut self, rad: f32) -> &mut Self {
        self.rotate(rad, Vec3::X)
    }

    pub fn rotate_y(&mut self, rad: f32) -> &mut Self {
        self.rotate(rad, Vec3::Y)
    }

    pub fn rotate_z(&mut self, rad: f32) -> &mut Self {
        self.rotate(rad, Vec3::Z)
    }

    /// Multiplies the current scale component-wise.
    pub fn scale(&mut self, factors: Vec3) -> &mut Self {
        self.scale *= factors;
        self
    }

    /// Resets the base values to identity. Overlays are kept.
    pub fn clear(&mut self) -> &mut Self {
        self.position = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.scale = Vec3::ONE;
        self
    }

    // ========================================================================
    // Animation overlays
    // ========================================================================

    /// Sets (or replaces) the overlay owned by `id`.
    pub fn set_overlay(&mut self, id: &str, overlay: Overlay) -> &mut Self {
        match self.overlays.iter_mut().find(|(key, _)| key == id) {
            Some((_, slot)) => *slot = overlay,
            None => self.overlays.push((id.to_string(), overlay)),
        }
        self.force_update = true;
        self
    }

    #[must_use]
    pub fn overlay(&self, id: &str) -> Option<&Overlay> {
        self.overlays
            .iter()
            .find_map(|(key, overlay)| (key == id).then_some(overlay))
    }

    pub fn reset_overlay(&mut self, id: &str) -> &mut Self {
        let before = self.overlays.len();
        self.overlays.retain(|(key, _)| key != id);
        self.force_update |= before != self.overlays.len();
        self
    }

    pub fn clear_overlays(&mut self) -> &mut Self {
        if !self.overlays.is_empty() {
            self.overlays.clear();
            self.force_update = true;
        }
        self
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Effective translation, rotation and scale with overlays folded in.
    #[must_use]
    pub fn effective(&self) -> (Vec3, Quat, Vec3) {
        self.overlays.iter().fold(
            (self.position, self.rotation, self.scale),
            |(t, r, s), (_, o)| (t + o.translation, r * o.rotation, s * o.scale),
        )
    }

    /// Recomputes the cached local matrix when anything changed since the
    /// last call. Returns whether it changed.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            let (translation, rotation, scale) = self.effective();
            self.local_matrix = Affine3A::from_scale_rotation_translation(scale, rotation, translation);

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Local matrix computed from the current values.
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        let (translation, rotation, scale) = self.effective();
        Affine3A::from_scale_rotation_translation(scale, rotation, translation)
    }

    /// Last matrix produced by [`Transform::update_local_matrix`].
    #[inline]
    #[must_use]
    pub fn cached_local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[must_use]
    pub fn local_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.local_matrix())
    }

    /// True when the transform maps every point to itself.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.local_matrix() == Affine3A::IDENTITY
    }

    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_applies_before_translation() {
        let mut t = Transform::new();
        t.translate(Vec3::new(1.0, 0.0, 0.0)).scale(Vec3::splat(2.0));
        let p = t.local_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn dirty_check_skips_unchanged() {
        let mut t = Transform::new();
        t.translate(Vec3::X);
        assert!(t.update_local_matrix());
        assert!(!t.update_local_matrix());
        t.set_overlay("clip", Overlay::IDENTITY);
        assert!(t.update_local_matrix());
    }
}
