// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! City Wellbeing: score cities by population, air quality and weather
//!
//! This crate provides the backend API that aggregates GeoDB, OpenAQ and
//! OpenWeatherMap data for a city and stores users' saved scores.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use error::AppError;
use services::{upstream::build_http_client, GoogleOAuthClient, ScorePipeline};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub score_pipeline: ScorePipeline,
    pub google_oauth: GoogleOAuthClient,
}

impl AppState {
    /// Wire the external API clients for `config` around an existing store.
    ///
    /// All outbound clients share one connection pool.
    pub fn new(config: Config, db: FirestoreDb) -> Result<Self, AppError> {
        let http = build_http_client(config.upstream_timeout)?;
        let score_pipeline = ScorePipeline::from_config(&config, http.clone());
        let google_oauth = GoogleOAuthClient::new(http, &config);

        Ok(Self {
            config,
            db,
            score_pipeline,
            google_oauth,
        })
    }
}
