//! Quadcam Render Engine
//!
//! The external-process collaborators of the playback core:
//!
//! ```text
//! front.mp4 ── extractor (CSV) ──┬── TelemetrySeries ── HUD
//!                                └── on failure: synthetic series
//!
//! selection + HUD sample ── ExportRequest ── ffmpeg drawtext ── clip URL
//! ```
//!
//! Neither collaborator is assumed to be a subprocess by its callers; the
//! traits [`TelemetryExtractor`] and [`Exporter`] are the seams.

pub mod export;
pub mod extract;
pub mod probe;
pub mod synthetic;

pub use export::*;
pub use extract::*;
pub use probe::*;
pub use synthetic::*;
