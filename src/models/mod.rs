// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod location;
pub mod record;
pub mod user;

pub use location::{AirQualityReading, Location, RawScoreInputs, WeatherReading};
pub use record::{NewRecord, Record, WellbeingFactors};
pub use user::{ExternalIdClaim, User};
