//! Host-side scheduler for the particle field.
//!
//! The window calls [`FrameLoop::tick`] on every redraw and keeps requesting
//! redraws while [`FrameLoop::is_running`] holds. Hiding the window pauses the
//! loop; showing it again resumes from exactly the state it stopped in.

use crate::field::ParticleField;
use crate::time::Time;

/// Display rate that one simulation frame (`dt = 1.0`) corresponds to.
pub const REFERENCE_FPS: f32 = 60.0;

/// Longest step taken in one tick, in frames. A stalled frame never catches up.
pub const MAX_FRAME_STEP: f32 = 4.0;

/// Convert a wall-clock delta to simulation frames, clamped to `max_step`.
#[inline]
pub fn frames_from_secs(secs: f32, max_step: f32) -> f32 {
    (secs * REFERENCE_FPS).clamp(0.0, max_step)
}

#[derive(Debug)]
pub struct FrameLoop {
    time: Time,
    running: bool,
    max_step: f32,
}

impl FrameLoop {
    /// A stopped loop. Call [`FrameLoop::resume`] to start it.
    pub fn new() -> Self {
        let mut time = Time::new();
        time.pause();
        Self {
            time,
            running: false,
            max_step: MAX_FRAME_STEP,
        }
    }

    /// Set the per-tick clamp, in frames.
    pub fn with_max_step(mut self, frames: f32) -> Self {
        self.max_step = frames.max(0.0);
        self
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Drive the clock with a fixed delta (seconds) instead of wall time.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.time.set_fixed_delta(delta);
    }

    /// Stop updating and redrawing. Returns `true` if the loop was running.
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.time.pause();
        was_running
    }

    /// Start or restart the loop. Returns `true` if the caller should
    /// schedule a fresh redraw (the loop was stopped).
    pub fn resume(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.time.resume();
        true
    }

    /// Advance the field by the time since the last tick.
    ///
    /// Returns the step taken in frames, or `None` if the loop is paused.
    pub fn tick(&mut self, field: &mut ParticleField) -> Option<f32> {
        if !self.running {
            return None;
        }
        let (_, delta) = self.time.update();
        let frames = frames_from_secs(delta, self.max_step);
        field.step(frames);
        Some(frames)
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
