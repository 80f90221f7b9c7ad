//! Quadcam Playback Core
//!
//! Keeps four independently loaded feeds on one logical timeline:
//! - **Timeline:** The shared logical clock (play, pause, seek, tick)
//! - **Clock drivers:** Per-feed drift correction against logical time + offset
//! - **Layout state:** The single writable pose/offset record
//! - **Session:** Owns all of the above plus the telemetry series
//! - **Runner:** One tokio task per session that schedules ticks and frames
//!
//! Everything except [`runner`] is synchronous and deterministic; the
//! runner only decides *when* the session is ticked.

pub mod driver;
pub mod layout_state;
pub mod media;
pub mod runner;
pub mod scene;
pub mod session;
pub mod timeline;

pub use driver::{ClockDriver, DriverState, DEFAULT_DRIFT_THRESHOLD_SECS};
pub use layout_state::LayoutState;
pub use media::{MediaInfo, MediaSource, SimulatedMedia};
pub use runner::{spawn_session, PlaybackHandle, RunnerIntervals};
pub use scene::{FeedSignal, PlaneProjection, RenderSink};
pub use session::{FeedStatus, FrameSnapshot, PlaybackSession, SessionConfig};
pub use timeline::{TickOutcome, Timeline};
