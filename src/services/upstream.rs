// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared plumbing for calls to external REST APIs.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build the HTTP client shared by every external API client.
///
/// The timeout bounds each request end to end; an expired timeout surfaces
/// as an ordinary transport error.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed building HTTP client: {e}")))
}

/// Send a request and decode a successful JSON body.
///
/// Transport failures, non-2xx statuses and undecodable bodies all become
/// `AppError::Upstream` tagged with `service`. A non-2xx reply is reported
/// by its status alone.
pub async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, AppError> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::upstream(service, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::upstream(service, format!("HTTP {}", status)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::upstream(service, format!("JSON parse error: {}", e)))
}
