// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application API key gate.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the application API key.
pub const API_KEY_HEADER: &str = "x-app-api-key";

/// Require `x-app-api-key` to match the configured `CLIENT_API_KEY`.
///
/// With no key configured every request is rejected.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    if !api_key_matches(provided, state.config.client_api_key.as_deref()) {
        tracing::warn!(
            path = %request.uri().path(),
            present = provided.is_some(),
            "Blocked request with invalid application API key"
        );
        return Err(AppError::Unauthorized(
            "Unauthorized: Invalid Application API Key",
        ));
    }

    Ok(next.run(request).await)
}

fn api_key_matches(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(provided), Some(expected)) if !expected.is_empty() => {
            provided.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_comparison() {
        assert!(api_key_matches(Some("secret"), Some("secret")));
        assert!(!api_key_matches(Some("secret2"), Some("secret")));
        assert!(!api_key_matches(Some(""), Some("secret")));
        assert!(!api_key_matches(None, Some("secret")));
        assert!(!api_key_matches(Some("secret"), None));
        assert!(!api_key_matches(Some(""), Some("")));
    }
}
