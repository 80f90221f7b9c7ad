//! Telemetry samples and nearest-sample lookup.
//!
//! A series is produced wholesale for one front-camera video and never
//! mutated afterwards. Timestamps are absolute seconds; the first sample
//! is the series' origin and lines up with logical time 0.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::camera::SyncOffsets;

/// A recorded value, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Parse a raw table cell: numbers become [`Scalar::Number`], anything
    /// else is kept as text. Empty cells are `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Scalar::Number(n)),
            _ => Some(Scalar::Text(trimmed.to_string())),
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// One recorded instant of vehicle data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Absolute seconds. Accepts numeric strings on input.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brake: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_signal: Option<Scalar>,
}

impl TelemetrySample {
    pub fn at(timestamp: f64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let secs = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{s}': {e}")))?,
    };
    if !secs.is_finite() {
        return Err(serde::de::Error::custom("timestamp must be finite"));
    }
    Ok(secs)
}

/// Sample closest to `target`; earliest wins on exact ties.
pub fn nearest(samples: &[TelemetrySample], target: f64) -> Option<&TelemetrySample> {
    let mut iter = samples.iter();
    let mut best = iter.next()?;
    let mut best_distance = (best.timestamp - target).abs();
    for sample in iter {
        let distance = (sample.timestamp - target).abs();
        if distance < best_distance {
            best = sample;
            best_distance = distance;
        }
    }
    Some(best)
}

/// Ordered telemetry for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetrySeries {
    samples: Vec<TelemetrySample>,
}

impl TelemetrySeries {
    /// Build a series, dropping samples with non-finite timestamps and
    /// stable-sorting the rest by timestamp.
    pub fn new(mut samples: Vec<TelemetrySample>) -> Self {
        samples.retain(|s| s.timestamp.is_finite());
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the first sample, the series' logical origin.
    pub fn origin(&self) -> Option<f64> {
        self.samples.first().map(|s| s.timestamp)
    }

    /// Span between first and last sample in seconds.
    pub fn span_secs(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    pub fn nearest(&self, target: f64) -> Option<&TelemetrySample> {
        nearest(&self.samples, target)
    }

    /// Absolute lookup timestamp for a logical time.
    ///
    /// `origin + current_time + front_offset`.
    pub fn lookup_target(&self, current_time: f64, front_offset: f64) -> Option<f64> {
        self.origin()
            .map(|origin| origin + current_time + front_offset)
    }

    /// HUD sample for a logical time. Telemetry is tied to the front feed,
    /// so only the front offset applies regardless of which view is shown.
    pub fn sample_at(&self, current_time: f64, offsets: &SyncOffsets) -> Option<&TelemetrySample> {
        let target = self.lookup_target(current_time, offsets.front)?;
        self.nearest(target)
    }
}

/// HUD values with defaults for missing data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudReadout {
    pub speed: f64,
    pub gear: String,
    pub power: f64,
    pub brake: bool,
    pub accelerator: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for HudReadout {
    fn default() -> Self {
        Self {
            speed: 0.0,
            gear: "-".to_string(),
            power: 0.0,
            brake: false,
            accelerator: 0.0,
            latitude: None,
            longitude: None,
        }
    }
}

impl From<Option<&TelemetrySample>> for HudReadout {
    fn from(sample: Option<&TelemetrySample>) -> Self {
        let Some(sample) = sample else {
            return Self::default();
        };
        let num = |v: &Option<Scalar>| v.as_ref().and_then(Scalar::as_f64);
        Self {
            speed: num(&sample.speed).unwrap_or(0.0),
            gear: sample
                .gear
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string()),
            power: num(&sample.power).unwrap_or(0.0),
            brake: match &sample.brake {
                Some(Scalar::Bool(b)) => *b,
                Some(Scalar::Text(t)) => matches!(t.trim(), "true" | "on" | "1"),
                Some(Scalar::Number(n)) => *n > 0.0,
                None => false,
            },
            accelerator: num(&sample.accelerator).unwrap_or(0.0),
            latitude: num(&sample.latitude),
            longitude: num(&sample.longitude),
        }
    }
}
