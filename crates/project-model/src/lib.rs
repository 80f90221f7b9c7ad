//! Quadcam Project Model
//!
//! Defines the core data contracts for quadcam projects:
//! - **Camera:** The four fixed feed views, their poses and sync offsets
//! - **Layout:** The persisted spatial layout (`layoutConfig` wire shape)
//! - **Project:** Named, server-identified layout records
//! - **Telemetry:** Recorded vehicle samples and nearest-sample lookup
//!
//! Rotations are radians everywhere in this crate. Degree conversion is
//! only offered as explicit boundary helpers on [`FeedPose`].

pub mod camera;
pub mod layout;
pub mod project;
pub mod telemetry;

pub use camera::*;
pub use layout::*;
pub use project::*;
pub use telemetry::*;
