//! The single writable pose/offset record of a session.
//!
//! Rendering and persistence only read from it: the scene projection is
//! built from [`LayoutState::config`] and saving goes through
//! [`LayoutState::to_config`].

use quadcam_project_model::{CameraView, FeedPose, LayoutConfig, PoseField, SyncOffsets};

/// Mutable layout with unsaved-change tracking.
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    config: LayoutConfig,
    revision: u64,
    saved_revision: u64,
}

impl LayoutState {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            revision: 0,
            saved_revision: 0,
        }
    }

    /// Replace the whole layout, e.g. when a project is opened.
    pub fn load(&mut self, config: LayoutConfig) {
        self.config = config;
        self.revision += 1;
        self.saved_revision = self.revision;
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn pose(&self, view: CameraView) -> &FeedPose {
        self.config.pose(view)
    }

    pub fn offsets(&self) -> SyncOffsets {
        self.config.sync_offsets
    }

    pub fn offset(&self, view: CameraView) -> f64 {
        self.config.sync_offsets.get(view)
    }

    /// Set one pose component.
    ///
    /// Any finite value is accepted, including negative scales. Non-finite
    /// input is ignored and `false` is returned.
    pub fn set_pose(&mut self, view: CameraView, field: PoseField, value: f64) -> bool {
        if !value.is_finite() {
            tracing::debug!(view = %view, ?field, "Ignoring non-finite pose value");
            return false;
        }
        self.config.pose_mut(view).set(field, value);
        self.revision += 1;
        true
    }

    /// Set a feed's sync offset in seconds. Non-finite input is ignored.
    pub fn set_offset(&mut self, view: CameraView, secs: f64) -> bool {
        if !secs.is_finite() {
            tracing::debug!(view = %view, "Ignoring non-finite sync offset");
            return false;
        }
        self.config.sync_offsets.set(view, secs);
        self.revision += 1;
        true
    }

    /// Snapshot for persistence.
    pub fn to_config(&self) -> LayoutConfig {
        self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Record that the current revision has been persisted.
    pub fn mark_saved(&mut self) {
        self.saved_revision = self.revision;
    }
}

impl From<LayoutConfig> for LayoutState {
    fn from(config: LayoutConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcam_project_model::Axis;

    #[test]
    fn test_targeted_setters() {
        let mut state = LayoutState::default();
        assert!(state.set_pose(CameraView::Left, PoseField::Position(Axis::Y), 1.5));
        assert!(state.set_pose(CameraView::Left, PoseField::Scale, 2.0));
        assert!(state.set_offset(CameraView::Back, -0.75));

        assert_eq!(state.pose(CameraView::Left).position, [-5.0, 1.5, 0.0]);
        assert_eq!(state.pose(CameraView::Left).scale, 2.0);
        assert_eq!(state.offset(CameraView::Back), -0.75);
        assert_eq!(state.pose(CameraView::Front), &LayoutConfig::standard().front);
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        let mut state = LayoutState::default();
        assert!(state.set_pose(CameraView::Front, PoseField::Scale, -3.0));
        assert!(state.set_pose(CameraView::Front, PoseField::Rotation(Axis::Z), 40.0));
        assert_eq!(state.pose(CameraView::Front).scale, -3.0);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut state = LayoutState::default();
        assert!(!state.set_pose(CameraView::Right, PoseField::Scale, f64::NAN));
        assert!(!state.set_offset(CameraView::Right, f64::INFINITY));
        assert!(!state.is_dirty());
        assert!(state.to_config().validate().is_ok());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut state = LayoutState::default();
        assert!(!state.is_dirty());
        state.set_offset(CameraView::Front, 1.0);
        assert!(state.is_dirty());
        state.mark_saved();
        assert!(!state.is_dirty());

        state.set_offset(CameraView::Front, 2.0);
        state.load(LayoutConfig::standard());
        assert!(!state.is_dirty());
        assert_eq!(state.offset(CameraView::Front), 0.0);
    }

    #[test]
    fn test_config_round_trip() {
        let mut state = LayoutState::default();
        state.set_pose(CameraView::Back, PoseField::Rotation(Axis::X), -0.25);
        state.set_offset(CameraView::Left, 3.5);

        let restored = LayoutState::from(state.to_config());
        assert_eq!(restored.config(), state.config());
    }
}
