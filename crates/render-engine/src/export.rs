//! Overlay export: request building and the ffmpeg backend.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use quadcam_common::config::AppConfig;
use quadcam_common::error::{QuadcamError, QuadcamResult};
use quadcam_project_model::{CameraView, HudReadout, TelemetrySample};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::extract::resolve_media_path;

/// What the exporter is asked to burn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub view: CameraView,
    pub filename: String,
    /// Zero or one sample. Empty means "no overlay text".
    pub telemetry: Vec<TelemetrySample>,
}

/// Where the finished clip can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub url: String,
}

/// Assemble an export request from the current selection and HUD sample.
pub fn build_export_request(
    view: CameraView,
    filename: impl Into<String>,
    sample: Option<&TelemetrySample>,
) -> ExportRequest {
    ExportRequest {
        view,
        filename: filename.into(),
        telemetry: sample.cloned().into_iter().collect(),
    }
}

/// Trait for export backends.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Produce the clip and return its URL. Failures are surfaced as-is;
    /// there is no fallback for exports.
    async fn export(&self, request: &ExportRequest) -> QuadcamResult<ExportResponse>;

    /// Check if this backend is available on the system.
    async fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Burns telemetry text onto the first seconds of a feed with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegExporter {
    ffmpeg_path: String,
    media_dir: PathBuf,
    exports_dir: PathBuf,
    clip_secs: f64,
    url_prefix: String,
}

impl FfmpegExporter {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ffmpeg_path: config.export.ffmpeg_path.clone(),
            media_dir: config.media_dir.clone(),
            exports_dir: config.exports_dir.clone(),
            clip_secs: config.export.clip_secs,
            url_prefix: config.export.url_prefix.clone(),
        }
    }

    fn output_name(&self, request: &ExportRequest) -> String {
        let stem = Path::new(&request.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("clip");
        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        format!("{}_{stem}_{stamp}.mp4", request.view)
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.url_prefix.trim_end_matches('/'))
    }

    fn build_args(&self, input: &Path, output: &Path, request: &ExportRequest) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-t".to_string(),
            format!("{:.3}", self.clip_secs),
        ];
        if let Some(filter) = overlay_filter(request.telemetry.first()) {
            args.push("-vf".to_string());
            args.push(filter);
        }
        args.extend(
            [
                "-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p", "-an",
            ]
            .map(String::from),
        );
        args.push(output.display().to_string());
        args
    }
}

#[async_trait]
impl Exporter for FfmpegExporter {
    async fn export(&self, request: &ExportRequest) -> QuadcamResult<ExportResponse> {
        let input = resolve_media_path(&self.media_dir, &request.filename)?;
        tokio::fs::create_dir_all(&self.exports_dir).await?;

        let file_name = self.output_name(request);
        let output_path = self.exports_dir.join(&file_name);
        let args = self.build_args(&input, &output_path, request);

        tracing::info!(
            view = %request.view,
            input = %input.display(),
            output = %output_path.display(),
            overlay = !request.telemetry.is_empty(),
            "Starting export"
        );
        tracing::debug!(args = ?args, "Running ffmpeg");

        let started = std::time::Instant::now();
        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| QuadcamError::export(format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuadcamError::export(format!(
                "ffmpeg export failed (status {}): {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            output = %output_path.display(),
            "Export finished"
        );
        Ok(ExportResponse {
            url: self.url_for(&file_name),
        })
    }

    async fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg_path).await
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// drawtext chain for one sample, or `None` when there is nothing to burn.
fn overlay_filter(sample: Option<&TelemetrySample>) -> Option<String> {
    let sample = sample?;
    let hud = HudReadout::from(Some(sample));
    let lines = [
        format!("SPEED {:.0} MPH", hud.speed),
        format!("GEAR {}", hud.gear),
        format!("POWER {:.0} kW", hud.power),
    ];
    let filters: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "drawtext=text={}:fontcolor=white:fontsize=32:box=1:boxcolor=black@0.5:boxborderw=8:x=24:y=24+{}*44",
                escape_drawtext(line),
                i
            )
        })
        .collect();
    Some(filters.join(","))
}

/// Escape text for an unquoted drawtext `text=` value inside `-vf`.
///
/// Three levels apply in order: drawtext's `%` expansion, the filter option
/// parser (`:` separates options) and the filtergraph parser.
fn escape_drawtext(text: &str) -> String {
    let expanded = backslash_escape(text, &['\\', '%']);
    let option = backslash_escape(&expanded, &['\\', '\'', ':']);
    backslash_escape(&option, &['\\', '\'', ',', ';', '[', ']'])
}

fn backslash_escape(text: &str, specials: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if specials.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) async fn command_exists(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadcam_project_model::Scalar;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            speed: Some(Scalar::from("64.6")),
            gear: Some(Scalar::from("D")),
            power: Some(Scalar::Number(21.0)),
            ..TelemetrySample::at(12.0)
        }
    }

    fn exporter() -> FfmpegExporter {
        let mut config = AppConfig::default();
        config.media_dir = PathBuf::from("/media");
        config.exports_dir = PathBuf::from("/exports-out");
        config.export.url_prefix = "/exports/".into();
        FfmpegExporter::from_config(&config)
    }

    #[test]
    fn test_build_request_with_and_without_sample() {
        let s = sample();
        let request = build_export_request(CameraView::Left, "left.mp4", Some(&s));
        assert_eq!(request.view, CameraView::Left);
        assert_eq!(request.telemetry, vec![s]);

        let empty = build_export_request(CameraView::Front, "front.mp4", None);
        assert!(empty.telemetry.is_empty());
    }

    #[test]
    fn test_request_wire_shape() {
        let request = build_export_request(CameraView::Back, "back.mp4", None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"view": "back", "filename": "back.mp4", "telemetry": []})
        );
    }

    #[test]
    fn test_overlay_text_from_sample() {
        let filter = overlay_filter(Some(&sample())).unwrap();
        assert!(filter.contains("SPEED 65 MPH"));
        assert!(filter.contains("GEAR D"));
        assert!(filter.contains("POWER 21 kW"));
        assert_eq!(filter.matches("drawtext=").count(), 3);
        assert!(overlay_filter(None).is_none());
    }

    #[test]
    fn test_args_skip_filter_without_telemetry() {
        let exp = exporter();
        let request = build_export_request(CameraView::Front, "front.mp4", None);
        let args = exp.build_args(Path::new("/media/front.mp4"), Path::new("/out.mp4"), &request);
        assert!(!args.contains(&"-vf".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/out.mp4"));

        let request = build_export_request(CameraView::Front, "front.mp4", Some(&sample()));
        let args = exp.build_args(Path::new("/media/front.mp4"), Path::new("/out.mp4"), &request);
        assert!(args.contains(&"-vf".to_string()));
        assert!(args.contains(&"10.000".to_string()));
    }

    /// One level of ffmpeg token parsing for unquoted input: `\\x` becomes `x`.
    fn unescape_level(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                out.extend(chars.next());
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("a:b"), "a\\\\:b");
        assert_eq!(escape_drawtext("it's"), "it\\\\\\'s");
        assert_eq!(escape_drawtext("GEAR D"), "GEAR D");
    }

    #[test]
    fn test_escaped_text_survives_both_parsers() {
        let text = "GEAR R' 50% a:b, [x]; c\\d";
        let escaped = escape_drawtext(text);
        let option_value = unescape_level(&unescape_level(&escaped));
        assert_eq!(option_value, "GEAR R' 50\\% a:b, [x]; c\\\\d");
    }

    #[test]
    fn test_apostrophe_in_gear_keeps_filter_intact() {
        let gear = TelemetrySample {
            gear: Some(Scalar::from("R'")),
            ..TelemetrySample::at(0.0)
        };
        let filter = overlay_filter(Some(&gear)).unwrap();
        assert!(filter.contains("GEAR R\\\\\\'"));
        assert!(!filter.contains("text='"));
        assert_eq!(filter.matches("drawtext=").count(), 3);
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_unavailable() {
        let mut config = AppConfig::default();
        config.export.ffmpeg_path = "quadcam-no-such-ffmpeg".into();
        let exp = FfmpegExporter::from_config(&config);
        assert!(!exp.is_available().await);
    }

    #[test]
    fn test_url_and_output_name() {
        let exp = exporter();
        let request = build_export_request(CameraView::Right, "clips/right cam.mp4", None);
        let name = exp.output_name(&request);
        assert!(name.starts_with("right_right cam_"));
        assert!(name.ends_with(".mp4"));
        assert_eq!(exp.url_for("x.mp4"), "/exports/x.mp4");
    }

    #[tokio::test]
    async fn test_missing_source_is_an_export_failure() {
        let exp = exporter();
        let request = build_export_request(CameraView::Front, "does-not-exist.mp4", None);
        let err = exp.export(&request).await.unwrap_err();
        assert!(matches!(err, QuadcamError::FileNotFound { .. }));
    }
}
