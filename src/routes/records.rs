// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved score records. Both routes sit behind the API key and session gates.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{NewRecord, Record};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/saveData", post(save_data))
        .route("/records", get(list_records))
}

#[derive(Serialize)]
pub struct SaveRecordResponse {
    pub message: String,
    pub record: Record,
}

/// Store a finished score for the logged-in user.
async fn save_data(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveRecordResponse>)> {
    const FAILED: &str = "Failed to save record";

    let Json(new_record) =
        body.map_err(|e| AppError::Validation(e.body_text()).with_message(FAILED))?;
    new_record
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()).with_message(FAILED))?;

    let record = state
        .db
        .create_record(&user.user_id, new_record)
        .await
        .map_err(|e| e.with_message(FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(SaveRecordResponse {
            message: "Record saved successfully".to_string(),
            record,
        }),
    ))
}

/// The logged-in user's records, highest score first.
async fn list_records(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Record>>> {
    let records = state
        .db
        .list_records_for_user(&user.user_id)
        .await
        .map_err(|e| e.with_message("Failed to retrieve records"))?;

    tracing::debug!(user_id = %user.user_id, count = records.len(), "Records listed");

    Ok(Json(records))
}
