// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Score aggregation pipeline.
//!
//! City resolution runs first; the air quality and weather lookups then run
//! concurrently against the resolved coordinates. Weather has no fallback, so
//! its failure fails the whole aggregation even when air quality succeeded.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{AirQualityReading, Location, RawScoreInputs, WeatherReading};
use crate::services::{AirQualityFetcher, CityResolver, WeatherFetcher};

/// Per-request state threaded through the pipeline stages.
#[derive(Debug)]
pub struct ScoreContext {
    pub query: String,
    pub location: Location,
}

impl ScoreContext {
    /// Merge the enrichment readings into the response payload.
    pub fn finish(self, air_quality: AirQualityReading, weather: WeatherReading) -> RawScoreInputs {
        RawScoreInputs {
            city: self.location.city,
            country: self.location.country,
            population: self.location.population,
            air_quality_raw: air_quality.value,
            air_quality_unit: air_quality.unit,
            temperature_raw: weather.temperature,
        }
    }
}

/// Orchestrates the three external lookups for one city.
#[derive(Clone)]
pub struct ScorePipeline {
    resolver: CityResolver,
    air_quality: AirQualityFetcher,
    weather: WeatherFetcher,
}

impl ScorePipeline {
    pub fn new(
        resolver: CityResolver,
        air_quality: AirQualityFetcher,
        weather: WeatherFetcher,
    ) -> Self {
        Self {
            resolver,
            air_quality,
            weather,
        }
    }

    /// Build the pipeline from configuration around a shared HTTP client.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        Self::new(
            CityResolver::new(
                http.clone(),
                &config.geodb_base_url,
                config.geodb_api_key.clone(),
            ),
            AirQualityFetcher::new(
                http.clone(),
                &config.openaq_base_url,
                config.openaq_api_key.clone(),
            ),
            WeatherFetcher::new(
                http,
                &config.openweather_base_url,
                config.openweather_api_key.clone(),
            ),
        )
    }

    /// Aggregate raw score inputs for `city_name`.
    pub async fn aggregate(&self, city_name: &str) -> Result<RawScoreInputs, AppError> {
        let ctx = self.resolve(city_name).await?;

        let (latitude, longitude) = (ctx.location.latitude, ctx.location.longitude);
        let (air_quality, weather) = tokio::join!(
            self.air_quality.fetch(latitude, longitude),
            self.weather.fetch(latitude, longitude),
        );

        // The air quality result is dropped when weather failed.
        let weather = weather?;

        tracing::info!(
            query = %ctx.query,
            city = %ctx.location.city,
            air_quality = air_quality.value,
            temperature = weather.temperature,
            "City data aggregated"
        );

        Ok(ctx.finish(air_quality, weather))
    }

    async fn resolve(&self, city_name: &str) -> Result<ScoreContext, AppError> {
        let location = self.resolver.resolve(city_name).await?;
        Ok(ScoreContext {
            query: city_name.to_string(),
            location,
        })
    }
}
