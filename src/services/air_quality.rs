// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PM2.5 lookup via the OpenAQ API.
//!
//! Air quality is optional enrichment: every failure degrades to
//! [`AirQualityReading::fallback`] instead of an error.

use crate::error::AppError;
use crate::models::AirQualityReading;
use crate::services::upstream::send_json;
use serde::Deserialize;

const SERVICE: &str = "OpenAQ";
/// Search radius around the coordinates, in meters.
const SEARCH_RADIUS_METERS: u32 = 10_000;

/// OpenAQ client returning the latest nearby PM2.5 measurement.
#[derive(Clone)]
pub struct AirQualityFetcher {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AirQualityFetcher {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Fetch the nearest PM2.5 reading, or the fallback reading.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> AirQualityReading {
        match self.fetch_latest(latitude, longitude).await {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                tracing::warn!(latitude, longitude, "No PM2.5 measurement nearby, using default AQ value");
                AirQualityReading::fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "OpenAQ request failed, using default AQ value");
                AirQualityReading::fallback()
            }
        }
    }

    async fn fetch_latest(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<AirQualityReading>, AppError> {
        let url = format!("{}/v2/latest", self.base_url.trim_end_matches('/'));

        let mut request = self.http.get(&url).query(&[
            ("coordinates", format!("{},{}", latitude, longitude)),
            ("radius", SEARCH_RADIUS_METERS.to_string()),
            ("limit", "1".to_string()),
            ("parameter", "pm25".to_string()),
            ("order_by", "lastUpdated".to_string()),
            ("sort", "desc".to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, key);
        }

        let response: OpenAqResponse = send_json(SERVICE, request).await?;

        Ok(response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.measurements.into_iter().next())
            .map(|m| AirQualityReading {
                value: m.value,
                unit: m.unit,
            }))
    }
}

#[derive(Debug, Deserialize)]
struct OpenAqResponse {
    #[serde(default)]
    results: Vec<OpenAqResult>,
}

#[derive(Debug, Deserialize)]
struct OpenAqResult {
    #[serde(default)]
    measurements: Vec<OpenAqMeasurement>,
}

#[derive(Debug, Deserialize)]
struct OpenAqMeasurement {
    value: f64,
    unit: String,
}
