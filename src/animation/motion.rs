use glam::Vec3;

use crate::animation::clip::Clip;
use crate::scene::ShapeKey;

/// A sequence of clips on one shape, built fluently.
///
/// ```ignore
/// let motion = Motion::new(cube)
///     .begin().spent(1000.0).move_to([1.0, 2.0, 0.0]).scale([1.5; 3])
///     .then().spent(2000.0).rotate_x(720.0)
///     .then().spent(1000.0).move_to([0.0, 0.0, 0.0])
///     .end();
/// animation.add_motion(motion)?;
/// ```
///
/// Each `begin`/`then` opens a clip starting where the previous one ended;
/// `then` and `end` commit the open clip. `wait` pushes later clips back.
#[derive(Debug, Clone)]
pub struct Motion {
    pub id: String,
    target: ShapeKey,
    clips: Vec<Clip>,
    length: f32,
    open: Option<Clip>,
}

impl Motion {
    #[must_use]
    pub fn new(target: ShapeKey) -> Self {
        Self {
            id: format!("motion-{}", uuid::Uuid::new_v4()),
            target,
            clips: Vec::new(),
            length: 0.0,
            open: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        for clip in &mut self.clips {
            clip.motion_id.clone_from(&self.id);
        }
        self
    }

    #[must_use]
    pub fn target(&self) -> ShapeKey {
        self.target
    }

    #[must_use]
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Total duration of the committed clips and waits.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[must_use]
    pub fn begin(mut self) -> Self {
        self.open = Some(Clip::new(self.target, self.length, self.id.clone()));
        self
    }

    #[must_use]
    pub fn then(mut self) -> Self {
        self.commit();
        self.begin()
    }

    #[must_use]
    pub fn end(mut self) -> Self {
        self.commit();
        self
    }

    #[must_use]
    pub fn wait(mut self, ms: f32) -> Self {
        self.length += ms.max(0.0);
        self
    }

    /// Duration of the open clip.
    #[must_use]
    pub fn spent(mut self, ms: f32) -> Self {
        self.with_open(|clip| clip.length = ms.max(0.0));
        self
    }

    #[must_use]
    pub fn move_to(mut self, position: impl Into<Vec3>) -> Self {
        let position = position.into();
        self.with_open(|clip| {
            clip.move_to(position);
        });
        self
    }

    #[must_use]
    pub fn translate(mut self, delta: impl Into<Vec3>) -> Self {
        let delta = delta.into();
        self.with_open(|clip| {
            clip.translate(delta);
        });
        self
    }

    /// Rotation by `degrees` around `axis`.
    #[must_use]
    pub fn rotate(mut self, degrees: f32, axis: impl Into<Vec3>) -> Self {
        let axis = axis.into();
        self.with_open(|clip| {
            clip.rotate(degrees.to_radians(), axis);
        });
        self
    }

    #[must_use]
    pub fn rotate_x(self, degrees: f32) -> Self {
        self.rotate(degrees, Vec3::X)
    }

    #[must_use]
    pub fn rotate_y(self, degrees: f32) -> Self {
        self.rotate(degrees, Vec3::Y)
    }

    #[must_use]
    pub fn rotate_z(self, degrees: f32) -> Self {
        self.rotate(degrees, Vec3::Z)
    }

    #[must_use]
    pub fn scale(mut self, ratios: impl Into<Vec3>) -> Self {
        let ratios = ratios.into();
        self.with_open(|clip| {
            clip.scale(ratios);
        });
        self
    }

    /// Drops every clip.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.length = 0.0;
        self.open = None;
    }

    fn commit(&mut self) {
        if let Some(clip) = self.open.take() {
            self.length += clip.length;
            self.clips.push(clip);
        }
    }

    fn with_open(&mut self, f: impl FnOnce(&mut Clip)) {
        match &mut self.open {
            Some(clip) => f(clip),
            None => log::warn!("motion `{}`: no open clip, call begin() first", self.id),
        }
    }
}
