//! Mock AQI trends for charts.
//!
//! There is no historical data; trends are synthesized around a city's
//! current AQI. Callers pass the RNG so output is reproducible under test.

use std::f64::consts::PI;

use rand::Rng;
use serde::Serialize;

use crate::aqi::round_aqi;

/// Base AQI used when a city has no reading.
pub const DEFAULT_TREND_BASE: u32 = 150;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One point on a trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// Axis label (`HH:00` or weekday).
    pub label: String,
    /// Synthesized AQI.
    pub aqi: u32,
}

/// 24 hourly points: a daily sine swing of ±30 plus ±10 noise.
pub fn hourly_trend<R: Rng + ?Sized>(base: u32, rng: &mut R) -> Vec<TrendPoint> {
    (0..24u8)
        .map(|hour| {
            let phase = f64::from(hour) / 24.0 * PI * 2.0;
            let variation = phase.sin() * 30.0 + (rng.random::<f64>() - 0.5) * 20.0;
            TrendPoint {
                label: format!("{hour:02}:00"),
                aqi: round_aqi(f64::from(base) + variation),
            }
        })
        .collect()
}

/// Seven daily points, Monday first, with ±25 noise.
pub fn weekly_trend<R: Rng + ?Sized>(base: u32, rng: &mut R) -> Vec<TrendPoint> {
    WEEKDAYS
        .iter()
        .map(|day| TrendPoint {
            label: (*day).to_string(),
            aqi: round_aqi(f64::from(base) + (rng.random::<f64>() - 0.5) * 50.0),
        })
        .collect()
}
