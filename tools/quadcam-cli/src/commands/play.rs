//! Headless synchronized playback.
//!
//! Feeds are simulated from probed metadata and driven by the real session
//! runner, so drift correction, offsets and the telemetry HUD behave as
//! they would behind a renderer.

use std::path::{Path, PathBuf};

use quadcam_common::config::AppConfig;
use quadcam_playback_core::{
    spawn_session, FeedSignal, FrameSnapshot, MediaInfo, PlaybackSession, RenderSink,
    RunnerIntervals, SessionConfig, SimulatedMedia,
};
use quadcam_project_model::{CameraView, LayoutConfig, ProjectId};
use quadcam_project_store::ProjectStore;
use quadcam_render_engine::probe_media;
use tokio::sync::watch;
use tokio::time::Duration;

use super::open_store;
use super::telemetry::{describe_origin, load};

pub struct PlayOptions {
    pub project: Option<ProjectId>,
    /// In `CameraView::ALL` order.
    pub feeds: [Option<PathBuf>; 4],
    pub start: Option<f64>,
    pub run_secs: Option<f64>,
    pub assume_duration: f64,
    pub status_every: u64,
}

/// Prints a status line every `every` frames.
struct ConsoleSink {
    every: u64,
    frames: u64,
}

impl RenderSink for ConsoleSink {
    fn present(&mut self, frame: &FrameSnapshot) {
        self.frames += 1;
        if self.frames % self.every != 0 {
            return;
        }
        println!("{}", status_line(frame));
    }

    fn name(&self) -> &str {
        "console"
    }
}

fn status_line(frame: &FrameSnapshot) -> String {
    let clock = &frame.clock;
    let feeds: Vec<String> = frame
        .feeds
        .iter()
        .map(|feed| match (feed.signal, feed.position) {
            (FeedSignal::Live, Some(pos)) => format!("{} {pos:>6.2}", feed.view.as_str()),
            (FeedSignal::Loading, _) => format!("{} ...", feed.view.as_str()),
            _ => format!("{} --", feed.view.as_str()),
        })
        .collect();
    format!(
        "{} {:>6.2}/{:<6.2} | {:>5.1} mph {:<2} | {}",
        if clock.is_playing { ">" } else { "||" },
        clock.current_time,
        clock.duration,
        frame.hud.speed,
        frame.hud.gear,
        feeds.join(" | ")
    )
}

fn resolve_feed(media_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        media_dir.join(path)
    }
}

async fn media_for(path: &Path, assume_duration: f64) -> SimulatedMedia {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let info = match probe_media(path).await {
        Some(probe) => MediaInfo::from_dimensions(probe.duration_secs, probe.width, probe.height),
        None => {
            tracing::warn!(
                path = %path.display(),
                assume_duration,
                "Could not probe feed, assuming duration"
            );
            MediaInfo::new(assume_duration, MediaInfo::DEFAULT_ASPECT)
        }
    };
    SimulatedMedia::new(label, info)
}

async fn wait_until_stopped(mut snapshots: watch::Receiver<FrameSnapshot>) {
    while snapshots.changed().await.is_ok() {
        if !snapshots.borrow().clock.is_playing {
            break;
        }
    }
}

pub async fn run(config: &AppConfig, options: PlayOptions) -> anyhow::Result<()> {
    let layout = match options.project {
        Some(id) => {
            let store = open_store(config).await?;
            let project = store.get(id).await?;
            println!("Using layout of project {} ({})", project.id, project.name);
            project.layout_config
        }
        None => LayoutConfig::standard(),
    };

    let session = PlaybackSession::new(SessionConfig::from(&config.playback), layout);
    let sink: Box<dyn RenderSink> = Box::new(ConsoleSink {
        every: options.status_every.max(1),
        frames: 0,
    });
    let handle = spawn_session(session, RunnerIntervals::from(&config.playback), Some(sink));

    for (view, feed) in CameraView::ALL.into_iter().zip(options.feeds) {
        let Some(feed) = feed else { continue };
        let path = resolve_feed(&config.media_dir, &feed);
        let media = media_for(&path, options.assume_duration).await;
        handle.bind(view, Box::new(media)).await?;

        if view == CameraView::Front {
            let telemetry = match path.strip_prefix(&config.media_dir) {
                Ok(relative) => load(config, &relative.to_string_lossy()).await,
                Err(_) => load(config, &feed.to_string_lossy()).await,
            };
            println!(
                "Telemetry: {} samples, {}",
                telemetry.series.len(),
                describe_origin(&telemetry.origin)
            );
            handle.load_telemetry(telemetry.series).await?;
        }
    }

    let clock = handle.call(|s| s.clock()).await?;
    if clock.duration <= 0.0 {
        println!("No feed reported a duration; the timeline will hold at 0.");
    }

    if let Some(start) = options.start {
        handle.scrub(start).await?;
    }
    handle.play().await?;

    let stopped = wait_until_stopped(handle.subscribe());
    match options.run_secs {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)) => {}
                _ = stopped => {}
                _ = tokio::signal::ctrl_c() => println!("\nInterrupted"),
            }
        }
        None => {
            tokio::select! {
                _ = stopped => {}
                _ = tokio::signal::ctrl_c() => println!("\nInterrupted"),
            }
        }
    }

    let session = handle.shutdown().await?;
    println!("{}", status_line(&session.snapshot()));
    Ok(())
}
