//! Media probing via ffprobe.

use std::path::Path;

use tokio::process::Command;

/// Stream facts needed to bind a feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaProbe {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

/// Probe duration and dimensions of the first video stream.
///
/// Returns `None` if ffprobe is missing or the output is unusable.
pub async fn probe_media(path: &Path) -> Option<MediaProbe> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height:format=duration",
            "-of",
            "default=noprint_wrappers=1",
        ])
        .arg(path)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        tracing::debug!(path = %path.display(), status = %output.status, "ffprobe failed");
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    parse_probe_output(&raw)
}

fn parse_probe_output(raw: &str) -> Option<MediaProbe> {
    let mut width = None;
    let mut height = None;
    let mut duration = None;
    for line in raw.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "width" => width = value.parse::<u32>().ok(),
            "height" => height = value.parse::<u32>().ok(),
            "duration" => duration = value.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0),
            _ => {}
        }
    }
    Some(MediaProbe {
        duration_secs: duration?,
        width: width.unwrap_or(0),
        height: height.unwrap_or(0),
    })
}
