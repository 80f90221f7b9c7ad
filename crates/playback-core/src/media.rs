//! Media source abstraction.
//!
//! A media source free-runs at its own rate once playing; the clock driver
//! only observes its position and hard-seeks it when it drifts.

use quadcam_common::error::{QuadcamError, QuadcamResult};
use tokio::time::{Duration, Instant};

/// Metadata reported once a source is ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Natural duration in seconds.
    pub duration_secs: f64,
    /// Width / height.
    pub aspect_ratio: f64,
}

impl MediaInfo {
    pub const DEFAULT_ASPECT: f64 = 16.0 / 9.0;

    pub fn new(duration_secs: f64, aspect_ratio: f64) -> Self {
        Self {
            duration_secs,
            aspect_ratio,
        }
    }

    /// Build from pixel dimensions, falling back to 16:9 when unknown.
    pub fn from_dimensions(duration_secs: f64, width: u32, height: u32) -> Self {
        let aspect_ratio = if width > 0 && height > 0 {
            width as f64 / height as f64
        } else {
            Self::DEFAULT_ASPECT
        };
        Self::new(duration_secs, aspect_ratio)
    }
}

/// A playable media element bound to one feed.
pub trait MediaSource: Send {
    /// Label for logging (usually the file name).
    fn label(&self) -> &str;

    /// Metadata, or `None` while the source is still loading.
    fn info(&self) -> Option<MediaInfo>;

    /// Current media position in seconds.
    fn position(&self) -> f64;

    /// Hard-seek to a position in seconds.
    fn seek(&mut self, secs: f64);

    /// Start advancing. May be refused (e.g. by an autoplay policy).
    fn play(&mut self) -> QuadcamResult<()>;

    /// Stop advancing.
    fn pause(&mut self);

    /// Release decoding resources. The source is unusable afterwards.
    fn release(&mut self);
}

/// A media element simulated from known metadata.
///
/// Advances with a monotonic clock at `rate` and loops at the end like a
/// looping video element. A seek is clamped into the media instead: a seek
/// to the end parks the source there until the next seek. It can be
/// configured to become ready late or to refuse playback.
#[derive(Debug)]
pub struct SimulatedMedia {
    label: String,
    info: MediaInfo,
    ready_at: Instant,
    rate: f64,
    anchor_secs: f64,
    running_since: Option<Instant>,
    refuse_play: bool,
    released: bool,
}

impl SimulatedMedia {
    pub fn new(label: impl Into<String>, info: MediaInfo) -> Self {
        Self {
            label: label.into(),
            info,
            ready_at: Instant::now(),
            rate: 1.0,
            anchor_secs: 0.0,
            running_since: None,
            refuse_play: false,
            released: false,
        }
    }

    /// Playback rate relative to wall time (1.0 = real time).
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Report metadata only after `delay`.
    pub fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_at = Instant::now() + delay;
        self
    }

    /// Refuse every `play()` call.
    pub fn refusing_playback(mut self) -> Self {
        self.refuse_play = true;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn clamp(&self, secs: f64) -> f64 {
        quadcam_common::clock::clamp_media_time(secs, self.info.duration_secs)
    }

    fn is_parked(&self) -> bool {
        self.info.duration_secs > 0.0 && self.anchor_secs >= self.info.duration_secs
    }

    fn wrap(&self, secs: f64) -> f64 {
        let duration = self.info.duration_secs;
        if duration <= 0.0 {
            return 0.0;
        }
        if secs >= duration {
            secs % duration
        } else {
            secs.max(0.0)
        }
    }
}

impl MediaSource for SimulatedMedia {
    fn label(&self) -> &str {
        &self.label
    }

    fn info(&self) -> Option<MediaInfo> {
        if self.released || Instant::now() < self.ready_at {
            return None;
        }
        Some(self.info)
    }

    fn position(&self) -> f64 {
        if self.is_parked() {
            return self.info.duration_secs;
        }
        let advanced = match self.running_since {
            Some(since) => since.elapsed().as_secs_f64() * self.rate,
            None => 0.0,
        };
        self.wrap(self.anchor_secs + advanced)
    }

    fn seek(&mut self, secs: f64) {
        self.anchor_secs = self.clamp(secs);
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
    }

    fn play(&mut self) -> QuadcamResult<()> {
        if self.released {
            return Err(QuadcamError::playback(format!(
                "{}: media has been released",
                self.label
            )));
        }
        if self.refuse_play {
            return Err(QuadcamError::playback(format!(
                "{}: playback was refused",
                self.label
            )));
        }
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.anchor_secs = self.position();
        self.running_since = None;
    }

    fn release(&mut self) {
        self.pause();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_from_dimensions() {
        let info = MediaInfo::from_dimensions(60.0, 1280, 960);
        assert!((info.aspect_ratio - 4.0 / 3.0).abs() < 1e-12);
        let unknown = MediaInfo::from_dimensions(60.0, 0, 0);
        assert!((unknown.aspect_ratio - 16.0 / 9.0).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_media_advances_at_rate() {
        let mut media = SimulatedMedia::new("front.mp4", MediaInfo::new(60.0, 1.5)).with_rate(2.0);
        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!((media.position() - 6.0).abs() < 1e-6);

        media.pause();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!((media.position() - 6.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_media_loops_at_end() {
        let mut media = SimulatedMedia::new("loop.mp4", MediaInfo::new(10.0, 1.5));
        media.seek(9.0);
        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!((media.position() - 1.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_past_end_parks_at_end() {
        let mut media = SimulatedMedia::new("short.mp4", MediaInfo::new(10.0, 1.5));
        media.seek(10.0);
        assert_eq!(media.position(), 10.0);

        media.play().unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(media.position(), 10.0);

        media.seek(25.0);
        assert_eq!(media.position(), 10.0);
        media.seek(-3.0);
        assert_eq!(media.position(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_media_reports_ready_late() {
        let media = SimulatedMedia::new("late.mp4", MediaInfo::new(10.0, 1.5))
            .ready_after(Duration::from_millis(500));
        assert!(media.info().is_none());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(media.info().is_some());
    }

    #[test]
    fn test_released_media_refuses_play() {
        let mut media = SimulatedMedia::new("gone.mp4", MediaInfo::new(10.0, 1.5));
        media.release();
        assert!(media.play().is_err());
        assert!(media.info().is_none());
        assert!(media.is_released());
    }
}
