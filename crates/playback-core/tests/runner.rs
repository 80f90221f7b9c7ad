//! Scheduling tests for the session runner, on tokio's paused clock.

use std::sync::{Arc, Mutex};

use quadcam_playback_core::{
    spawn_session, FeedSignal, FrameSnapshot, MediaInfo, PlaybackSession, RenderSink,
    RunnerIntervals, SimulatedMedia,
};
use quadcam_project_model::{CameraView, TelemetrySample, TelemetrySeries};
use tokio::time::{sleep, Duration};

fn media(label: &str, duration: f64) -> Box<SimulatedMedia> {
    Box::new(SimulatedMedia::new(label, MediaInfo::new(duration, 16.0 / 9.0)))
}

#[derive(Clone, Default)]
struct CountingSink {
    frames: Arc<Mutex<Vec<f64>>>,
}

impl RenderSink for CountingSink {
    fn present(&mut self, frame: &FrameSnapshot) {
        self.frames.lock().unwrap().push(frame.clock.current_time);
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeline_advances_at_tick_rate() {
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), None);
    handle.bind(CameraView::Front, media("front.mp4", 60.0)).await.unwrap();
    handle.play().await.unwrap();

    sleep(Duration::from_millis(1050)).await;
    let time = handle.call(|s| s.current_time()).await.unwrap();
    assert!((time - 1.0).abs() < 0.15, "time = {time}");

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_no_tick_after_pause_returns() {
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), None);
    handle.bind(CameraView::Front, media("front.mp4", 60.0)).await.unwrap();
    handle.play().await.unwrap();
    sleep(Duration::from_millis(450)).await;

    handle.pause().await.unwrap();
    let paused_at = handle.call(|s| s.current_time()).await.unwrap();
    sleep(Duration::from_secs(2)).await;
    let later = handle.call(|s| s.current_time()).await.unwrap();

    assert_eq!(paused_at, later);
    assert!(!handle.snapshot().clock.is_playing);
    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_fast_feed_is_pulled_back_into_sync() {
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), None);
    let fast = SimulatedMedia::new("back.mp4", MediaInfo::new(60.0, 16.0 / 9.0)).with_rate(1.5);
    handle.bind(CameraView::Back, Box::new(fast)).await.unwrap();
    handle.bind(CameraView::Front, media("front.mp4", 60.0)).await.unwrap();
    handle.set_offset(CameraView::Back, 2.0).await.unwrap();
    handle.play().await.unwrap();

    sleep(Duration::from_secs(3)).await;
    let (time, back) = handle
        .call(|s| (s.current_time(), s.driver(CameraView::Back).position()))
        .await
        .unwrap();
    let back = back.unwrap();
    // Threshold plus one tick step plus one frame of extra drift.
    assert!((back - (time + 2.0)).abs() < 0.45, "time = {time}, back = {back}");

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_late_media_becomes_live() {
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), None);
    let late = SimulatedMedia::new("left.mp4", MediaInfo::new(25.0, 4.0 / 3.0))
        .ready_after(Duration::from_millis(300));
    let info = handle.bind(CameraView::Left, Box::new(late)).await.unwrap();
    assert!(info.is_none());
    let pending = handle.call(|s| s.snapshot()).await.unwrap();
    assert_eq!(pending.feeds[CameraView::Left.index()].signal, FeedSignal::Loading);

    sleep(Duration::from_millis(400)).await;
    let frame = handle.snapshot();
    assert_eq!(frame.feeds[CameraView::Left.index()].signal, FeedSignal::Live);
    assert_eq!(frame.clock.duration, 25.0);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_end_of_timeline_rewinds_and_stops() {
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), None);
    handle.bind(CameraView::Front, media("front.mp4", 1.0)).await.unwrap();
    handle.play().await.unwrap();

    sleep(Duration::from_millis(1500)).await;
    let clock = handle.call(|s| s.clock()).await.unwrap();
    assert!(!clock.is_playing);
    assert_eq!(clock.current_time, 0.0);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_sink_receives_frames_and_hud_tracks_time() {
    let counting = CountingSink::default();
    let frames = counting.frames.clone();
    let sink: Box<dyn RenderSink> = Box::new(counting);
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), Some(sink));
    let series = TelemetrySeries::new(
        (0..100)
            .map(|i| TelemetrySample {
                speed: Some((i as f64).into()),
                ..TelemetrySample::at(1000.0 + i as f64 * 0.1)
            })
            .collect(),
    );
    handle.load_telemetry(series).await.unwrap();
    handle.bind(CameraView::Front, media("front.mp4", 10.0)).await.unwrap();
    handle.seek(2.0).await.unwrap();

    sleep(Duration::from_millis(200)).await;
    assert!(frames.lock().unwrap().len() >= 5);
    let frame = handle.snapshot();
    assert_eq!(frame.telemetry_target, Some(1002.0));
    assert_eq!(frame.hud.speed, 20.0);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_returns_paused_session() {
    let handle = spawn_session(PlaybackSession::default(), RunnerIntervals::default(), None);
    handle.bind(CameraView::Right, media("right.mp4", 30.0)).await.unwrap();
    handle.set_offset(CameraView::Right, 1.25).await.unwrap();
    handle.play().await.unwrap();

    let session = handle.shutdown().await.unwrap();
    assert!(!session.is_playing());
    assert_eq!(session.layout().offset(CameraView::Right), 1.25);
}
