//! Session runner: one tokio task owns the session.
//!
//! Every mutation is a message processed on that task, so time and offsets
//! have a single writer. The task runs two cadences:
//! - **tick** (default 100 ms): advances the timeline while playing
//! - **frame** (default ~30 fps): readiness polling, drift correction,
//!   snapshot publication and the optional render sink
//!
//! Commands are polled before timers, so once a `pause()` call has been
//! acknowledged no further tick runs until the next `play()`.

use quadcam_common::config::PlaybackDefaults;
use quadcam_common::error::{QuadcamError, QuadcamResult};
use quadcam_project_model::{CameraView, LayoutConfig, PoseField, TelemetrySeries};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

use crate::media::{MediaInfo, MediaSource};
use crate::scene::RenderSink;
use crate::session::{FrameSnapshot, PlaybackSession};

const COMMAND_QUEUE_DEPTH: usize = 64;

/// Wall-clock periods of the two cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerIntervals {
    pub tick: Duration,
    pub frame: Duration,
}

impl Default for RunnerIntervals {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            frame: Duration::from_millis(33),
        }
    }
}

impl From<&PlaybackDefaults> for RunnerIntervals {
    fn from(defaults: &PlaybackDefaults) -> Self {
        Self {
            tick: Duration::from_millis(defaults.tick_interval_ms.max(1)),
            frame: Duration::from_millis(defaults.frame_interval_ms.max(1)),
        }
    }
}

type SessionCall = Box<dyn FnOnce(&mut PlaybackSession) + Send>;

enum Command {
    Call(SessionCall),
    Shutdown(oneshot::Sender<PlaybackSession>),
}

/// Handle to a running session task.
pub struct PlaybackHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<FrameSnapshot>,
    task: JoinHandle<()>,
}

/// Move `session` onto its own task and start both cadences.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(
    session: PlaybackSession,
    intervals: RunnerIntervals,
    sink: Option<Box<dyn RenderSink>>,
) -> PlaybackHandle {
    let (commands, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (snapshot_tx, snapshots) = watch::channel(session.snapshot());
    let task = tokio::spawn(run(session, rx, snapshot_tx, sink, intervals));
    PlaybackHandle {
        commands,
        snapshots,
        task,
    }
}

async fn run(
    mut session: PlaybackSession,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<FrameSnapshot>,
    mut sink: Option<Box<dyn RenderSink>>,
    intervals: RunnerIntervals,
) {
    let mut ticker = time::interval_at(Instant::now() + intervals.tick, intervals.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames = time::interval(intervals.frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    if let Some(sink) = &sink {
        tracing::info!(sink = sink.name(), "Render sink attached");
    }

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Call(call)) => {
                    let was_playing = session.is_playing();
                    call(&mut session);
                    if session.is_playing() && !was_playing {
                        // First tick lands one full period after play.
                        ticker.reset();
                    }
                    snapshots.send_replace(session.snapshot());
                }
                Some(Command::Shutdown(reply)) => {
                    session.pause();
                    tracing::debug!("Playback task shutting down");
                    let _ = reply.send(session);
                    return;
                }
                None => {
                    session.pause();
                    tracing::debug!("All playback handles dropped");
                    return;
                }
            },

            _ = ticker.tick(), if session.is_playing() => {
                session.tick();
                snapshots.send_replace(session.snapshot());
            }

            _ = frames.tick() => {
                let frame = session.render_frame();
                if let Some(sink) = sink.as_mut() {
                    sink.present(&frame);
                }
                snapshots.send_replace(frame);
            }
        }
    }
}

impl PlaybackHandle {
    /// Run `f` on the session task and return its result.
    pub async fn call<R, F>(&self, f: F) -> QuadcamResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut PlaybackSession) -> R + Send + 'static,
    {
        let (ack, done) = oneshot::channel();
        let call: SessionCall = Box::new(move |session| {
            let _ = ack.send(f(session));
        });
        self.commands
            .send(Command::Call(call))
            .await
            .map_err(|_| QuadcamError::playback("Playback task is not running"))?;
        done.await
            .map_err(|_| QuadcamError::playback("Playback task stopped before replying"))
    }

    pub async fn play(&self) -> QuadcamResult<()> {
        self.call(|s| s.play()).await
    }

    /// Returns once the session is paused; no tick runs after this.
    pub async fn pause(&self) -> QuadcamResult<()> {
        self.call(|s| s.pause()).await
    }

    pub async fn toggle(&self) -> QuadcamResult<bool> {
        self.call(|s| {
            s.toggle();
            s.is_playing()
        })
        .await
    }

    pub async fn seek(&self, secs: f64) -> QuadcamResult<f64> {
        self.call(move |s| s.seek(secs)).await
    }

    pub async fn scrub(&self, secs: f64) -> QuadcamResult<f64> {
        self.call(move |s| s.scrub(secs)).await
    }

    pub async fn skip_forward(&self) -> QuadcamResult<f64> {
        self.call(|s| s.skip_forward()).await
    }

    pub async fn skip_back(&self) -> QuadcamResult<f64> {
        self.call(|s| s.skip_back()).await
    }

    pub async fn bind(
        &self,
        view: CameraView,
        media: Box<dyn MediaSource>,
    ) -> QuadcamResult<Option<MediaInfo>> {
        self.call(move |s| s.bind(view, media)).await
    }

    pub async fn unbind(&self, view: CameraView) -> QuadcamResult<()> {
        self.call(move |s| s.unbind(view)).await
    }

    pub async fn set_offset(&self, view: CameraView, secs: f64) -> QuadcamResult<bool> {
        self.call(move |s| s.set_offset(view, secs)).await
    }

    pub async fn set_pose(
        &self,
        view: CameraView,
        field: PoseField,
        value: f64,
    ) -> QuadcamResult<bool> {
        self.call(move |s| s.set_pose(view, field, value)).await
    }

    pub async fn select(&self, view: Option<CameraView>) -> QuadcamResult<()> {
        self.call(move |s| s.select(view)).await
    }

    pub async fn load_layout(&self, config: LayoutConfig) -> QuadcamResult<()> {
        self.call(move |s| s.load_layout(config)).await
    }

    pub async fn layout_config(&self) -> QuadcamResult<LayoutConfig> {
        self.call(|s| s.layout_config()).await
    }

    pub async fn load_telemetry(&self, series: TelemetrySeries) -> QuadcamResult<()> {
        self.call(move |s| s.load_telemetry(series)).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> FrameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FrameSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the task and take the session back (paused).
    pub async fn shutdown(self) -> QuadcamResult<PlaybackSession> {
        let (reply, session) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(reply))
            .await
            .map_err(|_| QuadcamError::playback("Playback task is not running"))?;
        let session = session
            .await
            .map_err(|_| QuadcamError::playback("Playback task stopped before replying"))?;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Playback task did not exit cleanly");
        }
        Ok(session)
    }
}
