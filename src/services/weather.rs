// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current temperature via the OpenWeatherMap API.

use crate::error::AppError;
use crate::models::WeatherReading;
use crate::services::upstream::send_json;
use serde::Deserialize;

const SERVICE: &str = "OpenWeatherMap";

/// OpenWeatherMap client. Temperatures are in Kelvin ("standard" units).
#[derive(Clone)]
pub struct WeatherFetcher {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherFetcher {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Fetch the current temperature at the given coordinates.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherReading, AppError> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));

        let request = self.http.get(&url).query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", self.api_key.clone().unwrap_or_default()),
            ("units", "standard".to_string()),
        ]);

        let response: OpenWeatherResponse = send_json(SERVICE, request).await?;

        Ok(WeatherReading {
            temperature: response.main.temp,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    main: OpenWeatherMain,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
}
