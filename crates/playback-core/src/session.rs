//! One viewing session: timeline, layout, four feeds and telemetry.
//!
//! The session is the only writer of the logical time and the offsets.
//! Every sync pass reads both once and hands the same values to all four
//! drivers, so no driver ever sees a new time paired with an old offset.

use quadcam_common::clock::PlaybackClock;
use quadcam_common::config::PlaybackDefaults;
use quadcam_project_model::{
    CameraView, HudReadout, LayoutConfig, PoseField, TelemetrySample, TelemetrySeries,
};
use serde::Serialize;

use crate::driver::{ClockDriver, DriverState, DEFAULT_DRIFT_THRESHOLD_SECS};
use crate::layout_state::LayoutState;
use crate::media::{MediaInfo, MediaSource};
use crate::scene::{FeedSignal, PlaneProjection};
use crate::timeline::{TickOutcome, Timeline};

/// Session tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Logical seconds added per tick.
    pub tick_step_secs: f64,
    pub drift_threshold_secs: f64,
    /// Step for skip back / skip forward.
    pub skip_secs: f64,
    /// Whether [`PlaybackSession::scrub`] pauses before seeking.
    pub pause_on_scrub: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_step_secs: Timeline::DEFAULT_STEP_SECS,
            drift_threshold_secs: DEFAULT_DRIFT_THRESHOLD_SECS,
            skip_secs: 5.0,
            pause_on_scrub: true,
        }
    }
}

impl From<&PlaybackDefaults> for SessionConfig {
    fn from(defaults: &PlaybackDefaults) -> Self {
        Self {
            tick_step_secs: defaults.tick_step_secs(),
            drift_threshold_secs: defaults.drift_threshold_secs,
            skip_secs: defaults.skip_secs,
            pause_on_scrub: defaults.pause_on_scrub,
        }
    }
}

/// Per-feed status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub view: CameraView,
    pub signal: FeedSignal,
    pub media: Option<String>,
    pub position: Option<f64>,
    pub duration: Option<f64>,
    pub offset: f64,
    pub playing: bool,
}

/// Everything a renderer or observer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub clock: PlaybackClock,
    pub planes: [PlaneProjection; 4],
    pub feeds: [FeedStatus; 4],
    pub selected: Option<CameraView>,
    pub telemetry_target: Option<f64>,
    pub hud: HudReadout,
}

/// A single viewing session.
#[derive(Debug)]
pub struct PlaybackSession {
    config: SessionConfig,
    timeline: Timeline,
    layout: LayoutState,
    drivers: [ClockDriver; 4],
    telemetry: TelemetrySeries,
    selected: Option<CameraView>,
}

impl PlaybackSession {
    pub fn new(config: SessionConfig, layout: LayoutConfig) -> Self {
        let drivers = CameraView::ALL.map(|view| ClockDriver::new(view, config.drift_threshold_secs));
        Self {
            config,
            timeline: Timeline::new(config.tick_step_secs),
            layout: LayoutState::new(layout),
            drivers,
            telemetry: TelemetrySeries::empty(),
            selected: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> PlaybackClock {
        self.timeline.clock()
    }

    pub fn current_time(&self) -> f64 {
        self.timeline.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.timeline.is_playing()
    }

    pub fn driver(&self, view: CameraView) -> &ClockDriver {
        &self.drivers[view.index()]
    }

    // --- feeds ---

    /// Bind media to a view, replacing whatever was there.
    ///
    /// If the media is already ready its duration is folded in right away;
    /// otherwise it is picked up by a later [`Self::poll_feeds`].
    pub fn bind(&mut self, view: CameraView, media: Box<dyn MediaSource>) -> Option<MediaInfo> {
        let driver = &mut self.drivers[view.index()];
        let was_loaded = driver.is_loaded();
        driver.set_playing(self.timeline.is_playing());
        let info = driver.bind(media);
        if info.is_some() || was_loaded {
            self.refresh_duration();
            self.sync_feeds();
        }
        info
    }

    /// Eject a view's media. No drift correction targets it afterwards.
    pub fn unbind(&mut self, view: CameraView) {
        let driver = &mut self.drivers[view.index()];
        let was_loaded = driver.is_loaded();
        driver.unbind();
        if was_loaded {
            self.refresh_duration();
        }
    }

    /// Promote feeds whose media became ready. Returns the views that did.
    pub fn poll_feeds(&mut self) -> Vec<CameraView> {
        let ready: Vec<CameraView> = self
            .drivers
            .iter_mut()
            .filter_map(|driver| driver.poll_ready().map(|_| driver.view()))
            .collect();
        if !ready.is_empty() {
            self.refresh_duration();
        }
        ready
    }

    /// Duration is the longest loaded feed.
    fn refresh_duration(&mut self) {
        let duration = self
            .drivers
            .iter()
            .filter_map(|d| d.info())
            .map(|info| info.duration_secs)
            .filter(|d| d.is_finite())
            .fold(0.0_f64, f64::max);
        if duration != self.timeline.duration() {
            tracing::info!(duration_secs = duration, "Timeline duration updated");
        }
        self.timeline.set_duration(duration);
    }

    /// Push the current time and offsets to every driver. Returns the
    /// number of corrective seeks issued.
    pub fn sync_feeds(&mut self) -> usize {
        let time = self.timeline.current_time();
        let offsets = self.layout.offsets();
        self.drivers
            .iter_mut()
            .filter_map(|driver| {
                let offset = offsets.get(driver.view());
                driver.tick(time, offset)
            })
            .count()
    }

    fn set_feeds_playing(&mut self, playing: bool) {
        for driver in &mut self.drivers {
            driver.set_playing(playing);
        }
    }

    // --- transport ---

    pub fn play(&mut self) {
        if self.timeline.is_playing() {
            return;
        }
        self.timeline.play();
        self.set_feeds_playing(true);
        tracing::info!(current_time = self.timeline.current_time(), "Playback started");
    }

    pub fn pause(&mut self) {
        if !self.timeline.is_playing() {
            return;
        }
        self.timeline.pause();
        self.set_feeds_playing(false);
        tracing::info!(current_time = self.timeline.current_time(), "Playback paused");
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek without touching the play state.
    pub fn seek(&mut self, secs: f64) -> f64 {
        let time = self.timeline.seek(secs);
        self.sync_feeds();
        time
    }

    /// Manual scrub: pauses first when configured to, then seeks.
    pub fn scrub(&mut self, secs: f64) -> f64 {
        if self.config.pause_on_scrub {
            self.pause();
        }
        self.seek(secs)
    }

    pub fn skip_forward(&mut self) -> f64 {
        let time = self.timeline.nudge(self.config.skip_secs);
        self.sync_feeds();
        time
    }

    pub fn skip_back(&mut self) -> f64 {
        let time = self.timeline.nudge(-self.config.skip_secs);
        self.sync_feeds();
        time
    }

    /// One timeline tick followed by a sync pass.
    pub fn tick(&mut self) -> TickOutcome {
        self.poll_feeds();
        let outcome = self.timeline.tick();
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Advanced(_) => {
                self.sync_feeds();
            }
            TickOutcome::Wrapped => {
                self.set_feeds_playing(false);
                self.sync_feeds();
                tracing::info!("Reached end of timeline, rewound to start");
            }
        }
        outcome
    }

    /// Per-frame pass: readiness, drift correction, snapshot.
    pub fn render_frame(&mut self) -> FrameSnapshot {
        self.poll_feeds();
        self.sync_feeds();
        self.snapshot()
    }

    // --- layout ---

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn layout_config(&self) -> LayoutConfig {
        self.layout.to_config()
    }

    /// Replace the layout (project opened). Feeds resync to the new offsets.
    pub fn load_layout(&mut self, config: LayoutConfig) {
        self.layout.load(config);
        self.sync_feeds();
    }

    pub fn mark_layout_saved(&mut self) {
        self.layout.mark_saved();
    }

    pub fn set_pose(&mut self, view: CameraView, field: PoseField, value: f64) -> bool {
        self.layout.set_pose(view, field, value)
    }

    /// Change a feed's offset; the feed resyncs on the same call.
    pub fn set_offset(&mut self, view: CameraView, secs: f64) -> bool {
        let changed = self.layout.set_offset(view, secs);
        if changed {
            self.sync_feeds();
        }
        changed
    }

    pub fn select(&mut self, view: Option<CameraView>) {
        self.selected = view;
    }

    pub fn selected(&self) -> Option<CameraView> {
        self.selected
    }

    // --- telemetry ---

    /// Replace the telemetry series wholesale.
    pub fn load_telemetry(&mut self, series: TelemetrySeries) {
        tracing::info!(
            samples = series.len(),
            span_secs = series.span_secs(),
            "Telemetry loaded"
        );
        self.telemetry = series;
    }

    pub fn telemetry(&self) -> &TelemetrySeries {
        &self.telemetry
    }

    /// Absolute telemetry timestamp for the current logical time.
    pub fn telemetry_target(&self) -> Option<f64> {
        self.telemetry
            .lookup_target(self.timeline.current_time(), self.layout.offset(CameraView::Front))
    }

    /// Sample shown on the HUD right now, if any.
    pub fn hud_sample(&self) -> Option<&TelemetrySample> {
        self.telemetry
            .sample_at(self.timeline.current_time(), &self.layout.offsets())
    }

    pub fn hud(&self) -> HudReadout {
        HudReadout::from(self.hud_sample())
    }

    // --- projection ---

    pub fn planes(&self) -> [PlaneProjection; 4] {
        CameraView::ALL.map(|view| {
            PlaneProjection::project(
                view,
                self.layout.pose(view),
                &self.driver(view).state(),
                self.selected == Some(view),
            )
        })
    }

    pub fn feeds(&self) -> [FeedStatus; 4] {
        CameraView::ALL.map(|view| {
            let driver = self.driver(view);
            let state = driver.state();
            FeedStatus {
                view,
                signal: FeedSignal::from(&state),
                media: driver.media_label().map(str::to_string),
                position: driver.position(),
                duration: match state {
                    DriverState::Loaded(info) => Some(info.duration_secs),
                    _ => None,
                },
                offset: self.layout.offset(view),
                playing: driver.is_playing(),
            }
        })
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            clock: self.clock(),
            planes: self.planes(),
            feeds: self.feeds(),
            selected: self.selected,
            telemetry_target: self.telemetry_target(),
            hud: self.hud(),
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(SessionConfig::default(), LayoutConfig::standard())
    }
}
