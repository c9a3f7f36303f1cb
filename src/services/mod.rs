// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod air_quality;
pub mod city;
pub mod google_oauth;
pub mod identity;
pub mod score;
pub mod upstream;
pub mod weather;

pub use air_quality::AirQualityFetcher;
pub use city::CityResolver;
pub use google_oauth::{GoogleOAuthClient, GoogleProfile};
pub use identity::exchange_credential;
pub use score::{ScoreContext, ScorePipeline};
pub use weather::WeatherFetcher;
