//! Telemetry extraction collaborator.
//!
//! Extraction runs an external program that prints a CSV table for one
//! video file. Whatever goes wrong (unresolvable file, no extractor
//! configured, process failure, empty table) the caller still receives a
//! series: [`load_telemetry`] falls back to the synthetic generator.

use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use quadcam_common::config::TelemetryConfig;
use quadcam_common::error::{QuadcamError, QuadcamResult};
use quadcam_project_model::{Scalar, TelemetrySample, TelemetrySeries};
use tokio::process::Command;

use crate::synthetic::synthetic_series;

const MPS_TO_MPH: f64 = 2.236_936_292;

/// Produces telemetry for a resolved media file.
#[async_trait]
pub trait TelemetryExtractor: Send + Sync {
    /// Extract samples from `path`.
    async fn extract(&self, path: &Path) -> QuadcamResult<Vec<TelemetrySample>>;

    /// Extractor name for logging.
    fn name(&self) -> &str;
}

/// Runs a configured program and parses its CSV stdout.
#[derive(Debug, Clone)]
pub struct ProcessExtractor {
    program: String,
    args: Vec<String>,
}

impl ProcessExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `None` when no extractor command is configured.
    pub fn from_config(config: &TelemetryConfig) -> Option<Self> {
        config
            .extractor_command
            .as_ref()
            .filter(|cmd| !cmd.trim().is_empty())
            .map(|cmd| Self::new(cmd.clone(), config.extractor_args.clone()))
    }
}

#[async_trait]
impl TelemetryExtractor for ProcessExtractor {
    async fn extract(&self, path: &Path) -> QuadcamResult<Vec<TelemetrySample>> {
        tracing::debug!(program = %self.program, args = ?self.args, path = %path.display(), "Running telemetry extractor");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                QuadcamError::extraction(format!("Failed to start {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuadcamError::extraction(format!(
                "{} failed (status {}): {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        parse_telemetry_csv(&output.stdout)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Column a CSV header maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Timestamp,
    Speed,
    SpeedMps,
    Gear,
    Latitude,
    Longitude,
    Brake,
    Accelerator,
    Power,
    TurnSignal,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let normalized = header.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let column = match normalized.as_str() {
            "timestamp" | "time" | "t" | "time_s" | "timestamp_s" => Column::Timestamp,
            "speed" | "speed_mph" => Column::Speed,
            "speed_mps" | "vehicle_speed_mps" => Column::SpeedMps,
            "gear" | "gear_state" => Column::Gear,
            "latitude" | "lat" | "latitude_deg" => Column::Latitude,
            "longitude" | "lon" | "lng" | "longitude_deg" => Column::Longitude,
            "brake" | "brake_applied" => Column::Brake,
            "accelerator" | "accelerator_pedal_position" | "throttle" => Column::Accelerator,
            "power" | "power_kw" => Column::Power,
            "turn_signal" | "blinker" => Column::TurnSignal,
            _ => return None,
        };
        Some(column)
    }
}

/// Parse an extractor's CSV output.
///
/// The header row names the columns; unknown columns are ignored and rows
/// without a numeric timestamp are skipped. A table without a timestamp
/// column is an error.
pub fn parse_telemetry_csv(data: &[u8]) -> QuadcamResult<Vec<TelemetrySample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| QuadcamError::extraction(format!("Unreadable telemetry header: {e}")))?
        .clone();
    let columns: Vec<Option<Column>> = headers.iter().map(Column::from_header).collect();
    if !columns.contains(&Some(Column::Timestamp)) {
        return Err(QuadcamError::extraction(
            "Telemetry table has no timestamp column",
        ));
    }

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| QuadcamError::extraction(format!("Bad telemetry row {row}: {e}")))?;
        match sample_from_record(&columns, &record) {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "Skipped telemetry rows without a timestamp");
    }
    Ok(samples)
}

fn sample_from_record(columns: &[Option<Column>], record: &csv::StringRecord) -> Option<TelemetrySample> {
    let mut sample = TelemetrySample::default();
    let mut timestamp = None;

    for (column, cell) in columns.iter().zip(record.iter()) {
        let Some(column) = column else { continue };
        let value = Scalar::parse(cell);
        match column {
            Column::Timestamp => {
                timestamp = cell.parse::<f64>().ok().filter(|t| t.is_finite());
            }
            Column::Speed => sample.speed = value,
            Column::SpeedMps => {
                if sample.speed.is_none() {
                    sample.speed = value.map(|v| match v.as_f64() {
                        Some(mps) => Scalar::Number(mps * MPS_TO_MPH),
                        None => v,
                    });
                }
            }
            Column::Gear => sample.gear = value,
            Column::Latitude => sample.latitude = value,
            Column::Longitude => sample.longitude = value,
            Column::Brake => sample.brake = value.map(normalize_bool),
            Column::Accelerator => sample.accelerator = value,
            Column::Power => sample.power = value,
            Column::TurnSignal => sample.turn_signal = value,
        }
    }

    sample.timestamp = timestamp?;
    Some(sample)
}

fn normalize_bool(value: Scalar) -> Scalar {
    match &value {
        Scalar::Text(t) => match t.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" => Scalar::Bool(true),
            "false" | "off" | "no" => Scalar::Bool(false),
            _ => value,
        },
        _ => value,
    }
}

/// Where a loaded series came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryOrigin {
    Extracted { extractor: String },
    Synthetic { reason: String },
}

/// A series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedTelemetry {
    pub series: TelemetrySeries,
    pub origin: TelemetryOrigin,
}

impl LoadedTelemetry {
    fn synthetic(reason: impl Into<String>) -> Self {
        Self {
            series: synthetic_series(),
            origin: TelemetryOrigin::Synthetic {
                reason: reason.into(),
            },
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, TelemetryOrigin::Synthetic { .. })
    }
}

/// Resolve a client-supplied filename inside `media_dir`.
///
/// Absolute paths and parent-directory components are rejected.
pub fn resolve_media_path(media_dir: &Path, filename: &str) -> QuadcamResult<PathBuf> {
    let relative = Path::new(filename);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if filename.trim().is_empty() || escapes {
        return Err(QuadcamError::validation_field(
            "filename",
            format!("'{filename}' is not a media file name"),
        ));
    }
    let path = media_dir.join(relative);
    if !path.is_file() {
        return Err(QuadcamError::FileNotFound { path });
    }
    Ok(path)
}

/// Load telemetry for a front-camera file, falling back to synthetic data.
///
/// Never fails: every failure is logged and replaced by the synthetic
/// series.
pub async fn load_telemetry(
    extractor: Option<&dyn TelemetryExtractor>,
    media_dir: &Path,
    filename: &str,
) -> LoadedTelemetry {
    let path = match resolve_media_path(media_dir, filename) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(filename, error = %e, "Media not accessible, using synthetic telemetry");
            return LoadedTelemetry::synthetic(e.to_string());
        }
    };

    let Some(extractor) = extractor else {
        tracing::info!(filename, "No telemetry extractor configured, using synthetic telemetry");
        return LoadedTelemetry::synthetic("no extractor configured");
    };

    match extractor.extract(&path).await {
        Ok(samples) if samples.is_empty() => {
            tracing::warn!(filename, extractor = extractor.name(), "Extractor returned no samples, using synthetic telemetry");
            LoadedTelemetry::synthetic("extractor returned no samples")
        }
        Ok(samples) => {
            let series = TelemetrySeries::new(samples);
            tracing::info!(
                filename,
                extractor = extractor.name(),
                samples = series.len(),
                "Telemetry extracted"
            );
            LoadedTelemetry {
                series,
                origin: TelemetryOrigin::Extracted {
                    extractor: extractor.name().to_string(),
                },
            }
        }
        Err(e) => {
            tracing::warn!(filename, extractor = extractor.name(), error = %e, "Extraction failed, using synthetic telemetry");
            LoadedTelemetry::synthetic(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_aliases() {
        let csv = b"time,speed_mph,Gear,lat,lon,brake,throttle,power_kw,blinker,extra\n\
                    100.0,10,D,37.1,-122.2,false,12.5,40,left,x\n\
                    100.5,12,D,37.2,-122.3,on,15,42,,y\n";
        let samples = parse_telemetry_csv(csv).unwrap();
        assert_eq!(samples.len(), 2);

        let first = &samples[0];
        assert_eq!(first.timestamp, 100.0);
        assert_eq!(first.speed, Some(Scalar::Number(10.0)));
        assert_eq!(first.gear, Some(Scalar::from("D")));
        assert_eq!(first.brake, Some(Scalar::Bool(false)));
        assert_eq!(first.turn_signal, Some(Scalar::from("left")));
        assert_eq!(samples[1].brake, Some(Scalar::Bool(true)));
        assert_eq!(samples[1].turn_signal, None);
    }

    #[test]
    fn test_parse_csv_converts_mps() {
        let csv = b"timestamp,vehicle_speed_mps\n0,10\n";
        let samples = parse_telemetry_csv(csv).unwrap();
        let mph = samples[0].speed.as_ref().and_then(Scalar::as_f64).unwrap();
        assert!((mph - 22.369).abs() < 1e-3);
    }

    #[test]
    fn test_parse_csv_skips_rows_without_timestamp() {
        let csv = b"timestamp,speed\n1,5\nnot-a-time,6\n,7\n2,8\n";
        let samples = parse_telemetry_csv(csv).unwrap();
        let times: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![1.0, 2.0]);
    }

    #[test]
    fn test_parse_csv_requires_timestamp_column() {
        let err = parse_telemetry_csv(b"speed,gear\n1,D\n").unwrap_err();
        assert!(matches!(err, QuadcamError::Extraction { .. }));
    }

    #[test]
    fn test_resolve_rejects_escaping_paths() {
        let dir = std::env::temp_dir();
        assert!(resolve_media_path(&dir, "../etc/passwd").unwrap_err().is_validation());
        assert!(resolve_media_path(&dir, "/etc/passwd").unwrap_err().is_validation());
        assert!(resolve_media_path(&dir, "").unwrap_err().is_validation());
    }

    #[test]
    fn test_extractor_from_config() {
        let mut config = TelemetryConfig::default();
        assert!(ProcessExtractor::from_config(&config).is_none());
        config.extractor_command = Some("sei-extract".into());
        config.extractor_args = vec!["--csv".into()];
        let extractor = ProcessExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.name(), "sei-extract");
    }
}
