// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public score aggregation API.

use crate::error::{AppError, Result};
use crate::models::RawScoreInputs;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/calculate-score", get(calculate_score))
}

#[derive(Deserialize)]
struct ScoreQuery {
    city: Option<String>,
}

/// Aggregate the raw inputs for a city's wellbeing score.
async fn calculate_score(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScoreQuery>,
) -> Result<Json<RawScoreInputs>> {
    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("City parameter is required.".to_string()))?;

    let inputs = state.score_pipeline.aggregate(city).await?;

    Ok(Json(inputs))
}
