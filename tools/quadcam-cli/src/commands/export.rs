//! Burn a telemetry overlay clip.

use quadcam_common::config::AppConfig;
use quadcam_project_model::{CameraView, ProjectId, SyncOffsets, TelemetrySeries};
use quadcam_project_store::ProjectStore;
use quadcam_render_engine::{build_export_request, Exporter, FfmpegExporter};

use super::open_store;
use super::telemetry::{describe_origin, load};

pub async fn run(
    config: &AppConfig,
    view: CameraView,
    file: String,
    front: Option<String>,
    time: f64,
    project: Option<ProjectId>,
) -> anyhow::Result<()> {
    let offsets = match project {
        Some(id) => {
            let store = open_store(config).await?;
            store.get(id).await?.layout_config.sync_offsets
        }
        None => SyncOffsets::default(),
    };

    let front = front.or_else(|| (view == CameraView::Front).then(|| file.clone()));
    let series = match &front {
        Some(front) => {
            let loaded = load(config, front).await;
            println!("Telemetry: {}", describe_origin(&loaded.origin));
            loaded.series
        }
        None => {
            println!("Telemetry: none (no front feed given)");
            TelemetrySeries::empty()
        }
    };

    let request = build_export_request(view, file, series.sample_at(time, &offsets));
    tracing::debug!(request = %serde_json::to_string(&request)?, "Export request");

    let exporter = FfmpegExporter::from_config(config);
    if !exporter.is_available().await {
        anyhow::bail!(
            "{} not found (set export.ffmpeg_path in {})",
            config.export.ffmpeg_path,
            quadcam_common::config::config_file_path().display()
        );
    }

    println!("Exporting {} clip of {}", request.view, request.filename);
    let response = exporter.export(&request).await?;
    println!("Export complete: {}", response.url);
    Ok(())
}
