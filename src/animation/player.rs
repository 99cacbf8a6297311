use crate::animation::AnimationTarget;
use crate::animation::motion::Motion;
use crate::animation::timeline::Timeline;
use crate::errors::Result;
use crate::scene::ShapeKey;

/// Frames between two [`AnimationEvent::Fps`] reports.
pub const FPS_WINDOW: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// Targets moved.
    Frame,
    /// Measured frame rate over the last [`FPS_WINDOW`] ticks.
    Fps(u32),
    /// The timeline ran to its end.
    Finish,
}

/// Plays the motions of a scene along one timeline.
///
/// Driven by the host: every [`Animation::update`] advances the clock by the
/// frame delta and applies the timeline. Transport calls (`play`, `stop`,
/// ...) only change state; their effect on the targets is applied on the
/// next update.
#[derive(Debug, Default)]
pub struct Animation {
    timeline: Timeline,
    motions: Vec<String>,
    state: PlayState,
    elapsed: f32,
    pending_reset: bool,
    pending_finish: bool,
    fps_ticks: u32,
    fps_elapsed: f32,
}

impl Animation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the committed clips of `motion`. Nothing is added when any clip
    /// conflicts with the timeline.
    pub fn add_motion(&mut self, motion: Motion) -> Result<()> {
        self.timeline.add_clips(motion.clips().iter().cloned())?;
        log::debug!("motion `{}` added with {} clips", motion.id, motion.clips().len());
        self.motions.push(motion.id);
        Ok(())
    }

    pub fn remove_motion(&mut self, motion_id: &str) -> bool {
        let before = self.motions.len();
        self.motions.retain(|id| id != motion_id);
        self.timeline.remove_motion(motion_id);
        before != self.motions.len()
    }

    /// Starts from the current position, undoing earlier overlays first.
    pub fn play(&mut self) {
        self.pending_reset = true;
        self.state = PlayState::Playing;
        self.fps_ticks = 0;
        self.fps_elapsed = 0.0;
    }

    pub fn play_at(&mut self, ms: f32) {
        self.elapsed = ms.max(0.0);
        self.play();
    }

    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlayState::Paused {
            self.play();
        }
    }

    /// Jumps every clip to its destination and rewinds the clock.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.elapsed = 0.0;
        self.pending_finish = true;
    }

    pub fn replay(&mut self) {
        self.elapsed = 0.0;
        self.play();
    }

    #[must_use]
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Milliseconds into the timeline.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub fn targets(&self) -> Vec<ShapeKey> {
        self.timeline.targets()
    }

    #[must_use]
    pub fn motion_count(&self) -> usize {
        self.motions.len()
    }

    /// Advances by `dt_ms` and moves the targets.
    pub fn update<T: AnimationTarget + ?Sized>(&mut self, dt_ms: f32, targets: &mut T) -> Vec<AnimationEvent> {
        let mut events = Vec::new();
        if self.pending_reset {
            self.timeline.reset(targets);
            self.pending_reset = false;
        }
        if self.pending_finish {
            self.timeline.finish(targets);
            self.pending_finish = false;
            events.push(AnimationEvent::Frame);
        }
        if self.state != PlayState::Playing {
            return events;
        }

        self.elapsed += dt_ms.max(0.0);
        if self.elapsed >= self.timeline.length() {
            self.timeline.finish(targets);
            self.state = PlayState::Stopped;
            self.elapsed = 0.0;
            log::debug!("animation finished");
            events.push(AnimationEvent::Frame);
            events.push(AnimationEvent::Finish);
            return events;
        }

        self.fps_ticks += 1;
        self.fps_elapsed += dt_ms;
        if self.fps_ticks == FPS_WINDOW {
            if self.fps_elapsed > 0.0 {
                let fps = (FPS_WINDOW as f32 * 1000.0 / self.fps_elapsed).round() as u32;
                events.push(AnimationEvent::Fps(fps));
            }
            self.fps_ticks = 0;
            self.fps_elapsed = 0.0;
        }

        self.timeline.apply_at(self.elapsed, targets);
        events.push(AnimationEvent::Frame);
        events
    }

    /// Removes every overlay the animation wrote and forgets all motions.
    pub fn clear<T: AnimationTarget + ?Sized>(&mut self, targets: &mut T) {
        self.timeline.reset(targets);
        self.timeline.clear();
        self.motions.clear();
        self.state = PlayState::Stopped;
        self.elapsed = 0.0;
        self.pending_reset = false;
        self.pending_finish = false;
    }
}
