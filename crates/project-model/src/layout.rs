//! Persisted layout configuration.
//!
//! The wire shape is fixed:
//!
//! ```json
//! { "front": {"scale":1, "position":[0,0,-5], "rotation":[0,0,0]},
//!   "back": {...}, "left": {...}, "right": {...},
//!   "syncOffsets": {"front":0, "back":0, "left":0, "right":0} }
//! ```

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::camera::{CameraView, FeedPose, SyncOffsets};
use crate::project::ProjectError;

/// Poses for all four views plus their sync offsets.
///
/// Every view must be present on the wire; a record missing a pose fails
/// to deserialize. `syncOffsets` defaults to zeros for older records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub front: FeedPose,
    pub back: FeedPose,
    pub left: FeedPose,
    pub right: FeedPose,
    #[serde(rename = "syncOffsets", default)]
    pub sync_offsets: SyncOffsets,
}

impl LayoutConfig {
    /// Standard layout: planes 5 units out on each side, facing the vehicle.
    pub fn standard() -> Self {
        Self {
            front: FeedPose::new(1.0, [0.0, 0.0, -5.0], [0.0, 0.0, 0.0]),
            back: FeedPose::new(1.0, [0.0, 0.0, 5.0], [0.0, PI, 0.0]),
            left: FeedPose::new(1.0, [-5.0, 0.0, 0.0], [0.0, FRAC_PI_2, 0.0]),
            right: FeedPose::new(1.0, [5.0, 0.0, 0.0], [0.0, -FRAC_PI_2, 0.0]),
            sync_offsets: SyncOffsets::default(),
        }
    }

    pub fn pose(&self, view: CameraView) -> &FeedPose {
        match view {
            CameraView::Front => &self.front,
            CameraView::Back => &self.back,
            CameraView::Left => &self.left,
            CameraView::Right => &self.right,
        }
    }

    pub fn pose_mut(&mut self, view: CameraView) -> &mut FeedPose {
        match view {
            CameraView::Front => &mut self.front,
            CameraView::Back => &mut self.back,
            CameraView::Left => &mut self.left,
            CameraView::Right => &mut self.right,
        }
    }

    /// Check that the layout can be persisted losslessly.
    ///
    /// Only finiteness is checked; out-of-range scales and rotations are
    /// legal edits.
    pub fn validate(&self) -> Result<(), ProjectError> {
        for view in CameraView::ALL {
            if !self.pose(view).is_finite() {
                return Err(ProjectError::validation(
                    format!("layoutConfig.{view}"),
                    "pose values must be finite numbers",
                ));
            }
        }
        if !self.sync_offsets.is_finite() {
            return Err(ProjectError::validation(
                "layoutConfig.syncOffsets",
                "offsets must be finite numbers",
            ));
        }
        Ok(())
    }

    /// Serialize to the persisted JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, ProjectError> {
        self.validate()?;
        serde_json::to_value(self).map_err(ProjectError::Parse)
    }

    /// Deserialize from a persisted JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProjectError> {
        let layout: Self = serde_json::from_value(value).map_err(ProjectError::Parse)?;
        layout.validate()?;
        Ok(layout)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::standard()
    }
}
