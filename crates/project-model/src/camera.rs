//! Camera views, feed poses, and per-feed sync offsets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four fixed dashcam feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraView {
    Front,
    Back,
    Left,
    Right,
}

impl CameraView {
    /// All views in canonical order.
    pub const ALL: [CameraView; 4] = [
        CameraView::Front,
        CameraView::Back,
        CameraView::Left,
        CameraView::Right,
    ];

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            CameraView::Front => "front",
            CameraView::Back => "back",
            CameraView::Left => "left",
            CameraView::Right => "right",
        }
    }

    /// Position in [`CameraView::ALL`].
    pub fn index(self) -> usize {
        match self {
            CameraView::Front => 0,
            CameraView::Back => 1,
            CameraView::Left => 2,
            CameraView::Right => 3,
        }
    }
}

impl fmt::Display for CameraView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown view name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown camera view '{0}' (expected front, back, left or right)")]
pub struct ParseViewError(pub String);

impl FromStr for CameraView {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(CameraView::Front),
            "back" => Ok(CameraView::Back),
            "left" => Ok(CameraView::Left),
            "right" => Ok(CameraView::Right),
            _ => Err(ParseViewError(s.to_string())),
        }
    }
}

/// Axis index into a position or rotation triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Spatial placement of one feed's plane around the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedPose {
    /// Uniform plane scale. Expected positive, not enforced.
    pub scale: f64,
    /// World position `[x, y, z]`.
    pub position: [f64; 3],
    /// Euler rotation `[x, y, z]` in radians.
    pub rotation: [f64; 3],
}

impl Default for FeedPose {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: [0.0; 3],
            rotation: [0.0; 3],
        }
    }
}

impl FeedPose {
    pub fn new(scale: f64, position: [f64; 3], rotation: [f64; 3]) -> Self {
        Self {
            scale,
            position,
            rotation,
        }
    }

    /// Rotation converted to whole degrees for display.
    pub fn rotation_degrees(&self) -> [f64; 3] {
        self.rotation.map(|r| r.to_degrees().round())
    }

    /// Set one rotation axis from a degree value entered at the UI boundary.
    pub fn set_rotation_degrees(&mut self, axis: Axis, degrees: f64) {
        self.rotation[axis.index()] = degrees.to_radians();
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite()
            && self.position.iter().all(|v| v.is_finite())
            && self.rotation.iter().all(|v| v.is_finite())
    }
}

/// Field selector for targeted pose edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseField {
    Scale,
    Position(Axis),
    /// Rotation in radians.
    Rotation(Axis),
}

impl FeedPose {
    /// Apply a single-field edit. No range validation is performed.
    pub fn set(&mut self, field: PoseField, value: f64) {
        match field {
            PoseField::Scale => self.scale = value,
            PoseField::Position(axis) => self.position[axis.index()] = value,
            PoseField::Rotation(axis) => self.rotation[axis.index()] = value,
        }
    }
}

/// Per-feed time offsets in seconds, added to logical time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SyncOffsets {
    pub front: f64,
    pub back: f64,
    pub left: f64,
    pub right: f64,
}

impl SyncOffsets {
    pub fn get(&self, view: CameraView) -> f64 {
        match view {
            CameraView::Front => self.front,
            CameraView::Back => self.back,
            CameraView::Left => self.left,
            CameraView::Right => self.right,
        }
    }

    pub fn set(&mut self, view: CameraView, secs: f64) {
        match view {
            CameraView::Front => self.front = secs,
            CameraView::Back => self.back = secs,
            CameraView::Left => self.left = secs,
            CameraView::Right => self.right = secs,
        }
    }

    pub fn is_finite(&self) -> bool {
        CameraView::ALL.iter().all(|v| self.get(*v).is_finite())
    }
}
