//! Deterministic synthetic telemetry.
//!
//! Used whenever real extraction is not possible, so the HUD always has
//! data to show. Shape (0.1 s spacing, 600 samples):
//! - samples 0..50: speed ramps 0 -> 65 mph
//! - samples 50..400: cruise between 65 and 70 mph
//! - samples 400..600: ramp down to 0, braking

use quadcam_project_model::{Scalar, TelemetrySample, TelemetrySeries};

pub const SYNTHETIC_SAMPLES: usize = 600;
pub const SYNTHETIC_SPACING_SECS: f64 = 0.1;

const RAMP_END: usize = 50;
const CRUISE_END: usize = 400;
const CRUISE_BASE_MPH: f64 = 65.0;
const CRUISE_SWING_MPH: f64 = 5.0;

const START_LATITUDE: f64 = 37.7749;
const START_LONGITUDE: f64 = -122.4194;
const METERS_PER_DEGREE: f64 = 111_320.0;
const MPH_TO_MPS: f64 = 0.44704;

/// Speed in mph for sample `i`.
pub fn synthetic_speed(i: usize) -> f64 {
    if i < RAMP_END {
        CRUISE_BASE_MPH * i as f64 / RAMP_END as f64
    } else if i < CRUISE_END {
        let phase = (i - RAMP_END) as f64 * 0.05;
        CRUISE_BASE_MPH + CRUISE_SWING_MPH * 0.5 * (1.0 - phase.cos())
    } else {
        let last = (SYNTHETIC_SAMPLES - 1) as f64;
        let span = last - CRUISE_END as f64;
        CRUISE_BASE_MPH * (last - i as f64) / span
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Build the synthetic series.
pub fn synthetic_samples() -> Vec<TelemetrySample> {
    let mut latitude = START_LATITUDE;
    let longitude = START_LONGITUDE;

    (0..SYNTHETIC_SAMPLES)
        .map(|i| {
            let speed = synthetic_speed(i);
            let (accelerator, power, brake) = if i < RAMP_END {
                (60.0, 85.0, false)
            } else if i < CRUISE_END {
                (18.0, 15.0, false)
            } else {
                (0.0, -30.0, speed > 0.0)
            };
            let gear = if speed > 0.0 { "D" } else { "P" };

            let sample = TelemetrySample {
                speed: Some(Scalar::Number(round1(speed))),
                gear: Some(Scalar::from(gear)),
                latitude: Some(Scalar::Number(latitude)),
                longitude: Some(Scalar::Number(longitude)),
                brake: Some(Scalar::Bool(brake)),
                accelerator: Some(Scalar::Number(accelerator)),
                power: Some(Scalar::Number(power)),
                ..TelemetrySample::at(round1(i as f64 * SYNTHETIC_SPACING_SECS))
            };
            latitude += speed * MPH_TO_MPS * SYNTHETIC_SPACING_SECS / METERS_PER_DEGREE;
            sample
        })
        .collect()
}

pub fn synthetic_series() -> TelemetrySeries {
    TelemetrySeries::new(synthetic_samples())
}
