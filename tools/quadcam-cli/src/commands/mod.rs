pub mod check;
pub mod export;
pub mod layout;
pub mod play;
pub mod projects;
pub mod telemetry;

use quadcam_common::config::AppConfig;
use quadcam_project_store::JsonFileStore;
use quadcam_render_engine::ProcessExtractor;

/// Open the project store configured for this run.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<JsonFileStore> {
    let path = config.store_path();
    JsonFileStore::open(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open project store {}: {e}", path.display()))
}

/// The configured extractor, if any.
pub fn extractor(config: &AppConfig) -> Option<ProcessExtractor> {
    ProcessExtractor::from_config(&config.telemetry)
}
