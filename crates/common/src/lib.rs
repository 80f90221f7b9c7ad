//! Quadcam Common Utilities
//!
//! Shared infrastructure for all quadcam crates:
//! - Error types and result aliases
//! - Playback clock and drift measurement for feed synchronization
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
