// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! City resolution via the GeoDB Cities API.

use crate::error::AppError;
use crate::models::Location;
use crate::services::upstream::send_json;
use serde::Deserialize;

const SERVICE: &str = "GeoDB";
const RAPIDAPI_HOST: &str = "wft-geo-db.p.rapidapi.com";

/// Resolves free-text city names to the most populous match.
#[derive(Clone)]
pub struct CityResolver {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CityResolver {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Resolve `city_name` to a location, taking the first (largest) match.
    pub async fn resolve(&self, city_name: &str) -> Result<Location, AppError> {
        let url = format!("{}/v1/geo/cities", self.base_url.trim_end_matches('/'));

        let mut request = self
            .http
            .get(&url)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .query(&[
                ("namePrefix", city_name),
                ("limit", "1"),
                ("includeDeleted", "none"),
                ("sort", "-population"),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-rapidapi-key", key);
        }

        let response: GeoDbResponse = send_json(SERVICE, request).await?;

        let city = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::CityNotFound("City not found via GeoDB.".to_string()))?;

        tracing::debug!(
            query = city_name,
            city = %city.name,
            country = %city.country,
            "City resolved"
        );

        Ok(Location {
            city: city.name,
            country: city.country,
            latitude: city.latitude,
            longitude: city.longitude,
            population: city.population,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeoDbResponse {
    #[serde(default)]
    data: Vec<GeoDbCity>,
}

#[derive(Debug, Deserialize)]
struct GeoDbCity {
    name: String,
    country: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    population: u64,
}
