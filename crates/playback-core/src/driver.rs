//! Per-feed clock driver.
//!
//! A driver binds one media source to one view and keeps it within
//! [`DEFAULT_DRIFT_THRESHOLD_SECS`] of `logical_time + offset` by hard
//! seeking. Corrections are never rate adjustments.

use quadcam_common::clock::{clamp_media_time, DriftMeasurement};
use quadcam_project_model::CameraView;

use crate::media::{MediaInfo, MediaSource};

/// Drift tolerated before a feed is force-seeked.
pub const DEFAULT_DRIFT_THRESHOLD_SECS: f64 = 0.3;

/// Binding state of a driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverState {
    /// No media bound ("no signal").
    Unloaded,
    /// Media bound but metadata not yet reported.
    Pending,
    /// Media ready; drift correction active.
    Loaded(MediaInfo),
}

/// Drives one feed against the shared logical clock.
pub struct ClockDriver {
    view: CameraView,
    media: Option<Box<dyn MediaSource>>,
    info: Option<MediaInfo>,
    playing: bool,
    wants_playing: bool,
    threshold_secs: f64,
}

impl std::fmt::Debug for ClockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockDriver")
            .field("view", &self.view)
            .field("media", &self.media.as_ref().map(|m| m.label().to_string()))
            .field("info", &self.info)
            .field("playing", &self.playing)
            .finish()
    }
}

impl ClockDriver {
    pub fn new(view: CameraView, threshold_secs: f64) -> Self {
        Self {
            view,
            media: None,
            info: None,
            playing: false,
            wants_playing: false,
            threshold_secs,
        }
    }

    pub fn view(&self) -> CameraView {
        self.view
    }

    pub fn state(&self) -> DriverState {
        match (&self.media, self.info) {
            (None, _) => DriverState::Unloaded,
            (Some(_), None) => DriverState::Pending,
            (Some(_), Some(info)) => DriverState::Loaded(info),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state(), DriverState::Loaded(_))
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn info(&self) -> Option<MediaInfo> {
        self.info
    }

    /// Current media position, if any media is bound.
    pub fn position(&self) -> Option<f64> {
        self.media.as_ref().map(|m| m.position())
    }

    pub fn media_label(&self) -> Option<&str> {
        self.media.as_deref().map(|m| m.label())
    }

    /// Bind a new source, ejecting any previous one.
    ///
    /// Returns the metadata immediately if the source is already ready;
    /// otherwise the driver stays `Pending` until [`Self::poll_ready`]
    /// reports it.
    pub fn bind(&mut self, media: Box<dyn MediaSource>) -> Option<MediaInfo> {
        if self.media.is_some() {
            self.unbind();
        }
        tracing::info!(view = %self.view, media = media.label(), "Feed bound");
        self.media = Some(media);
        self.poll_ready()
    }

    /// Transition `Pending -> Loaded` once the source reports metadata.
    ///
    /// Returns the metadata exactly once, on the transition.
    pub fn poll_ready(&mut self) -> Option<MediaInfo> {
        if self.info.is_some() {
            return None;
        }
        let info = self.media.as_ref()?.info()?;
        tracing::info!(
            view = %self.view,
            duration_secs = info.duration_secs,
            aspect_ratio = info.aspect_ratio,
            "Feed ready"
        );
        self.info = Some(info);
        if self.wants_playing {
            self.apply_playing(true);
        }
        Some(info)
    }

    /// Start or stop the underlying media.
    ///
    /// While `Pending` the request is remembered and applied on readiness.
    /// A refused `play()` is logged and leaves the feed paused.
    pub fn set_playing(&mut self, playing: bool) {
        self.wants_playing = playing;
        if self.is_loaded() {
            self.apply_playing(playing);
        }
    }

    fn apply_playing(&mut self, playing: bool) {
        if self.playing == playing {
            return;
        }
        let Some(media) = self.media.as_mut() else {
            return;
        };
        if playing {
            match media.play() {
                Ok(()) => self.playing = true,
                Err(e) => {
                    tracing::warn!(view = %self.view, error = %e, "Feed refused playback");
                }
            }
        } else {
            media.pause();
            self.playing = false;
        }
    }

    /// Correct drift against `logical_time + offset`.
    ///
    /// Returns the seek target when a correction was issued. Unloaded and
    /// pending feeds never seek.
    pub fn tick(&mut self, logical_time: f64, offset: f64) -> Option<f64> {
        let duration = self.info?.duration_secs;
        let media = self.media.as_mut()?;
        let target = clamp_media_time(logical_time + offset, duration);
        let drift = DriftMeasurement {
            expected_secs: target,
            actual_secs: media.position(),
        };
        if !drift.exceeds_threshold_secs(self.threshold_secs) {
            return None;
        }
        tracing::debug!(
            view = %self.view,
            drift_secs = drift.drift_secs(),
            target_secs = target,
            "Resyncing feed"
        );
        media.seek(target);
        Some(target)
    }

    /// Eject the media and release it immediately.
    pub fn unbind(&mut self) {
        if let Some(mut media) = self.media.take() {
            media.pause();
            media.release();
            tracing::info!(view = %self.view, media = media.label(), "Feed ejected");
        }
        self.info = None;
        self.playing = false;
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.unbind();
    }
}
