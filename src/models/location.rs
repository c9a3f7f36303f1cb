// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Location and score-input models produced by the aggregation pipeline.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Canonical city resolved from a free-text name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u64,
}

/// PM2.5 reading near a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    pub value: f64,
    pub unit: String,
}

impl AirQualityReading {
    pub const FALLBACK_VALUE: f64 = 15.0;
    pub const FALLBACK_UNIT: &'static str = "µg/m³";

    /// Reading used when no measurement is available.
    pub fn fallback() -> Self {
        Self {
            value: Self::FALLBACK_VALUE,
            unit: Self::FALLBACK_UNIT.to_string(),
        }
    }
}

/// Current temperature in Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
}

/// Raw inputs the client turns into a wellbeing score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RawScoreInputs {
    pub city: String,
    pub country: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub population: u64,
    pub air_quality_raw: f64,
    pub air_quality_unit: String,
    pub temperature_raw: f64,
}
