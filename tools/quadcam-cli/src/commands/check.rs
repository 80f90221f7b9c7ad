//! Check external tools and configuration.

use std::process::{Command, Stdio};

use quadcam_common::config::{config_file_path, AppConfig};

fn tool_version(binary: &str) -> Option<String> {
    let output = Command::new(binary)
        .arg("-version")
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
}

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("quadcam System Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        match AppConfig::read(&config_path) {
            Ok(_) => println!("[OK] Config: {}", config_path.display()),
            Err(e) => println!("[WARN] {e} (using defaults)"),
        }
    } else {
        println!("[INFO] Config: {} (not present, using defaults)", config_path.display());
    }
    println!("     Project store: {}", config.store_path().display());
    println!("     Media dir:     {}", config.media_dir.display());
    println!("     Exports dir:   {}", config.exports_dir.display());

    if !config.media_dir.is_dir() {
        println!("[WARN] Media directory does not exist; telemetry will be synthetic");
    }

    let mut export_ok = true;
    for binary in [config.export.ffmpeg_path.as_str(), "ffprobe"] {
        match tool_version(binary) {
            Some(version) => println!("[OK] {binary}: {version}"),
            None => {
                export_ok = false;
                println!("[WARN] {binary}: not found");
            }
        }
    }

    match &config.telemetry.extractor_command {
        Some(cmd) => println!("[OK] Telemetry extractor: {cmd} {}", config.telemetry.extractor_args.join(" ")),
        None => println!("[INFO] No telemetry extractor configured; synthetic telemetry will be used"),
    }

    println!();
    if export_ok {
        println!("Playback and export are available.");
    } else {
        println!("Playback works; export and feed probing need ffmpeg/ffprobe in PATH.");
    }
    Ok(())
}
