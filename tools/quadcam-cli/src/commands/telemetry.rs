//! Telemetry extraction and lookup.

use quadcam_common::config::AppConfig;
use quadcam_project_model::{HudReadout, SyncOffsets};
use quadcam_render_engine::{load_telemetry, LoadedTelemetry, TelemetryExtractor, TelemetryOrigin};

use super::extractor;

pub(crate) async fn load(config: &AppConfig, file: &str) -> LoadedTelemetry {
    let extractor = extractor(config);
    load_telemetry(
        extractor.as_ref().map(|e| e as &dyn TelemetryExtractor),
        &config.media_dir,
        file,
    )
    .await
}

pub(crate) fn describe_origin(origin: &TelemetryOrigin) -> String {
    match origin {
        TelemetryOrigin::Extracted { extractor } => format!("extracted by {extractor}"),
        TelemetryOrigin::Synthetic { reason } => format!("synthetic ({reason})"),
    }
}

pub(crate) fn print_hud(hud: &HudReadout) {
    println!("  Speed:       {:.1} mph", hud.speed);
    println!("  Gear:        {}", hud.gear);
    println!("  Power:       {:.1} kW", hud.power);
    println!("  Brake:       {}", if hud.brake { "on" } else { "off" });
    println!("  Accelerator: {:.0}%", hud.accelerator);
    match (hud.latitude, hud.longitude) {
        (Some(lat), Some(lon)) => println!("  Position:    {lat:.5}, {lon:.5}"),
        _ => println!("  Position:    -"),
    }
}

pub async fn extract(config: &AppConfig, file: &str, json: bool) -> anyhow::Result<()> {
    let loaded = load(config, file).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&loaded.series)?);
        return Ok(());
    }

    println!("Telemetry for {file}: {}", describe_origin(&loaded.origin));
    println!("  Samples: {}", loaded.series.len());
    println!("  Span:    {:.1}s", loaded.series.span_secs());
    if let Some(origin) = loaded.series.origin() {
        println!("  Origin:  {origin}");
    }
    Ok(())
}

pub async fn lookup(
    config: &AppConfig,
    file: &str,
    time: f64,
    front_offset: f64,
) -> anyhow::Result<()> {
    let loaded = load(config, file).await;
    let offsets = SyncOffsets {
        front: front_offset,
        ..SyncOffsets::default()
    };

    let target = loaded.series.lookup_target(time, front_offset);
    let sample = loaded.series.sample_at(time, &offsets);

    println!("Telemetry: {}", describe_origin(&loaded.origin));
    match (target, sample) {
        (Some(target), Some(sample)) => {
            println!("Lookup target {target:.3} -> sample at {:.3}", sample.timestamp);
        }
        _ => println!("No telemetry available; HUD shows defaults"),
    }
    print_hud(&HudReadout::from(sample));
    Ok(())
}
