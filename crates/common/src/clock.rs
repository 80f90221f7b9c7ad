//! Clock and timing utilities for feed synchronization.
//!
//! Every feed is driven against one logical playback clock. This module
//! provides:
//! - The logical clock record shared by the timeline and its observers
//! - Drift measurement between a feed's media position and its target
//! - Media-time clamping

use serde::{Deserialize, Serialize};

/// Logical playback clock for one viewing session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackClock {
    /// Whether the timeline is advancing.
    pub is_playing: bool,

    /// Logical time in seconds, never negative.
    pub current_time: f64,

    /// Longest bound feed in seconds; 0 until a feed reports its length.
    pub duration: f64,
}

impl PlaybackClock {
    /// Clamp a logical time to `[0, duration]`.
    pub fn clamp(&self, secs: f64) -> f64 {
        clamp_media_time(secs, self.duration)
    }
}

/// Drift measurement between a feed and its expected position.
#[derive(Debug, Clone, Copy)]
pub struct DriftMeasurement {
    /// Position the feed should be at (seconds).
    pub expected_secs: f64,
    /// Position the feed reports (seconds).
    pub actual_secs: f64,
}

impl DriftMeasurement {
    /// Drift in seconds (positive = feed is ahead).
    pub fn drift_secs(&self) -> f64 {
        self.actual_secs - self.expected_secs
    }

    /// Whether drift strictly exceeds an acceptable threshold.
    pub fn exceeds_threshold_secs(&self, threshold_secs: f64) -> bool {
        self.drift_secs().abs() > threshold_secs
    }
}

/// Clamp a media position to `[0, duration]`.
///
/// Non-finite input maps to 0; a non-positive duration pins everything to 0.
pub fn clamp_media_time(secs: f64, duration: f64) -> f64 {
    if !secs.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    secs.clamp(0.0, duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_measurement() {
        let drift = DriftMeasurement {
            expected_secs: 10.0,
            actual_secs: 12.0,
        };
        assert!((drift.drift_secs() - 2.0).abs() < 1e-9);
        assert!(drift.exceeds_threshold_secs(0.3));
        assert!(!drift.exceeds_threshold_secs(2.5));
    }

    #[test]
    fn test_drift_at_threshold_does_not_exceed() {
        let drift = DriftMeasurement {
            expected_secs: 1.0,
            actual_secs: 1.25,
        };
        assert!(!drift.exceeds_threshold_secs(0.25));
    }

    #[test]
    fn test_clamp_media_time() {
        assert_eq!(clamp_media_time(1005.0, 60.0), 60.0);
        assert_eq!(clamp_media_time(-3.0, 60.0), 0.0);
        assert_eq!(clamp_media_time(12.5, 60.0), 12.5);
        assert_eq!(clamp_media_time(f64::NAN, 60.0), 0.0);
        assert_eq!(clamp_media_time(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_playback_clock_wire_names() {
        let clock = PlaybackClock {
            is_playing: true,
            current_time: 1.5,
            duration: 30.0,
        };
        let json = serde_json::to_string(&clock).unwrap();
        assert!(json.contains("\"isPlaying\":true"));
        assert!(json.contains("\"currentTime\":1.5"));
    }
}
