// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Saved wellbeing score records.

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Per-factor scores computed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WellbeingFactors {
    pub population_density: f64,
    pub air_quality: f64,
    pub weather_comfort: f64,
}

/// Stored score record in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Record ID (also used as document ID)
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    pub city: String,
    pub country: String,
    pub total_score: f64,
    pub wellbeing_factors: WellbeingFactors,
    /// When the record was saved (RFC 3339)
    pub saved_at: String,
}

/// Record body submitted by the client.
///
/// The owner is never part of the body; it comes from the session.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    #[validate(length(min = 1, max = 200, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 200, message = "country is required"))]
    pub country: String,
    pub total_score: f64,
    pub wellbeing_factors: WellbeingFactors,
}

impl NewRecord {
    /// Turn the submission into a stored record for `user_id`.
    pub fn into_record(self, id: String, user_id: String, saved_at: String) -> Record {
        Record {
            id,
            user_id,
            city: self.city,
            country: self.country,
            total_score: self.total_score,
            wellbeing_factors: self.wellbeing_factors,
            saved_at,
        }
    }
}
