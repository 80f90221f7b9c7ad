//! Shared logical clock.
//!
//! `Stopped(t) <-> Running(t)`. The timeline only owns the clock; the
//! session pushes each new time to the clock drivers.

use quadcam_common::clock::PlaybackClock;

/// Tolerance when comparing accumulated ticks against the duration.
const END_EPSILON: f64 = 1e-9;

/// Result of one [`Timeline::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    /// Time advanced to the contained value.
    Advanced(f64),
    /// End reached: stopped and rewound to 0.
    Wrapped,
}

/// The single logical timeline of a session.
#[derive(Debug, Clone)]
pub struct Timeline {
    clock: PlaybackClock,
    step_secs: f64,
}

impl Timeline {
    /// Default tick step (100 ms of wall time).
    pub const DEFAULT_STEP_SECS: f64 = 0.1;

    pub fn new(step_secs: f64) -> Self {
        Self {
            clock: PlaybackClock::default(),
            step_secs,
        }
    }

    pub fn clock(&self) -> PlaybackClock {
        self.clock
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time
    }

    pub fn duration(&self) -> f64 {
        self.clock.duration
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing
    }

    pub fn step_secs(&self) -> f64 {
        self.step_secs
    }

    /// Start advancing. Allowed with a zero duration; time simply holds
    /// at 0 until a feed reports its length.
    pub fn play(&mut self) {
        self.clock.is_playing = true;
    }

    /// Stop advancing, keeping the current time.
    pub fn pause(&mut self) {
        self.clock.is_playing = false;
    }

    /// Jump to `secs`, clamped to `[0, duration]`. Never changes play state.
    pub fn seek(&mut self, secs: f64) -> f64 {
        self.clock.current_time = self.clock.clamp(secs);
        self.clock.current_time
    }

    /// Relative seek (skip forward/back).
    pub fn nudge(&mut self, delta_secs: f64) -> f64 {
        self.seek(self.clock.current_time + delta_secs)
    }

    /// Update the duration and pull the current time back inside it.
    pub fn set_duration(&mut self, duration: f64) {
        self.clock.duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.clock.current_time = self.clock.clamp(self.clock.current_time);
    }

    /// Advance by one step while running.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.clock.is_playing {
            return TickOutcome::Idle;
        }
        if self.clock.duration <= 0.0 {
            return TickOutcome::Advanced(self.clock.current_time);
        }
        let next = self.clock.current_time + self.step_secs;
        if next + END_EPSILON >= self.clock.duration {
            self.clock.is_playing = false;
            self.clock.current_time = 0.0;
            return TickOutcome::Wrapped;
        }
        self.clock.current_time = next;
        TickOutcome::Advanced(next)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP_SECS)
    }
}
