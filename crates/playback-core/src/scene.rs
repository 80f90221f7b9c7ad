//! Scene projection for the rendering sink.
//!
//! The 3D scene graph lives outside this crate. Each frame it receives one
//! [`PlaneProjection`] per view, derived purely from the layout state and
//! the bound media.

use quadcam_project_model::{CameraView, FeedPose};
use serde::Serialize;

use crate::driver::DriverState;
use crate::media::MediaInfo;
use crate::session::FrameSnapshot;

/// Base plane width in scene units at scale 1.
pub const BASE_PLANE_WIDTH: f64 = 4.0;

/// What a plane displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSignal {
    /// No media bound.
    NoSignal,
    /// Media bound, metadata not yet known.
    Loading,
    /// Media texture is live.
    Live,
}

impl From<&DriverState> for FeedSignal {
    fn from(state: &DriverState) -> Self {
        match state {
            DriverState::Unloaded => FeedSignal::NoSignal,
            DriverState::Pending => FeedSignal::Loading,
            DriverState::Loaded(_) => FeedSignal::Live,
        }
    }
}

/// A textured plane as the rendering sink should draw it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneProjection {
    pub view: CameraView,
    pub position: [f64; 3],
    /// Euler rotation in radians.
    pub rotation: [f64; 3],
    pub width: f64,
    pub height: f64,
    pub selected: bool,
    pub signal: FeedSignal,
}

impl PlaneProjection {
    /// Project one feed. Height follows the media's aspect ratio, or 16:9
    /// until the media reports its dimensions.
    pub fn project(view: CameraView, pose: &FeedPose, state: &DriverState, selected: bool) -> Self {
        let aspect = match state {
            DriverState::Loaded(info) if info.aspect_ratio.is_finite() && info.aspect_ratio > 0.0 => {
                info.aspect_ratio
            }
            _ => MediaInfo::DEFAULT_ASPECT,
        };
        let width = BASE_PLANE_WIDTH * pose.scale;
        Self {
            view,
            position: pose.position,
            rotation: pose.rotation,
            width,
            height: width / aspect,
            selected,
            signal: FeedSignal::from(state),
        }
    }
}

/// Receives one snapshot per rendered frame.
pub trait RenderSink: Send {
    /// Draw a frame. Must not block.
    fn present(&mut self, frame: &FrameSnapshot);

    /// Sink name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_size_follows_scale_and_aspect() {
        let pose = FeedPose::new(1.5, [0.0, 0.0, -5.0], [0.0; 3]);
        let state = DriverState::Loaded(MediaInfo::new(60.0, 4.0 / 3.0));
        let plane = PlaneProjection::project(CameraView::Front, &pose, &state, true);

        assert!((plane.width - 6.0).abs() < 1e-12);
        assert!((plane.height - 4.5).abs() < 1e-12);
        assert!(plane.selected);
        assert_eq!(plane.signal, FeedSignal::Live);
    }

    #[test]
    fn test_unbound_plane_uses_default_aspect() {
        let pose = FeedPose::default();
        let plane = PlaneProjection::project(CameraView::Back, &pose, &DriverState::Unloaded, false);
        assert!((plane.height - 4.0 * 9.0 / 16.0).abs() < 1e-12);
        assert_eq!(plane.signal, FeedSignal::NoSignal);

        let pending = PlaneProjection::project(CameraView::Back, &pose, &DriverState::Pending, false);
        assert_eq!(pending.signal, FeedSignal::Loading);
    }

    #[test]
    fn test_degenerate_aspect_falls_back() {
        let pose = FeedPose::default();
        let state = DriverState::Loaded(MediaInfo::new(10.0, 0.0));
        let plane = PlaneProjection::project(CameraView::Left, &pose, &state, false);
        assert!((plane.height - 2.25).abs() < 1e-12);
    }
}
