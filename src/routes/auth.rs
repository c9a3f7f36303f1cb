// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth login, logout and session inspection routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_session_token, resolve_session, session_cookie, session_removal_cookie,
};
use crate::services::exchange_credential;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Cookie binding the OAuth `state` to the browser that started the login.
pub const OAUTH_NONCE_COOKIE: &str = "wellbeing_oauth_nonce";
const CALLBACK_PATH: &str = "/auth/google/callback";
/// How long a login may take between redirect and callback.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route(CALLBACK_PATH, get(auth_callback))
        .route("/auth/logout", get(logout))
        .route("/api/user", get(current_user))
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

fn session_secret(state: &AppState) -> Result<&[u8]> {
    state
        .config
        .session_secret
        .as_deref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("SESSION_SECRET is not set")))
}

/// Start OAuth flow - redirect to Google's consent screen.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let secret = session_secret(&state)?;

    let mut nonce = [0u8; 16];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate OAuth nonce")))?;
    let nonce = hex::encode(nonce);

    let oauth_state = sign_state(&nonce, now_millis()?, secret)?;
    let auth_url = state.google_oauth.authorize_url(&oauth_state)?;

    let nonce_cookie = Cookie::build((OAUTH_NONCE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies())
        .max_age(time::Duration::milliseconds(STATE_MAX_AGE_MS as i64))
        .build();

    tracing::info!("Starting OAuth flow, redirecting to Google");

    Ok((jar.add(nonce_cookie), Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, find or create the user, start a session.
///
/// Every outcome redirects to `/`; failures simply leave no session behind.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let secure = state.config.secure_cookies();
    let expected_nonce = jar.get(OAUTH_NONCE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(
        Cookie::build(OAUTH_NONCE_COOKIE)
            .path(CALLBACK_PATH)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    );

    match complete_login(&state, params, expected_nonce).await {
        Ok(token) => (jar.add(session_cookie(token, secure)), Redirect::temporary("/")),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            (jar, Redirect::temporary("/"))
        }
    }
}

async fn complete_login(
    state: &AppState,
    params: CallbackParams,
    expected_nonce: Option<String>,
) -> Result<String> {
    if let Some(error) = params.error {
        return Err(AppError::Validation(format!("OAuth error from Google: {error}")));
    }

    let secret = session_secret(state)?;

    let nonce = params
        .state
        .as_deref()
        .and_then(|s| verify_state(s, secret, now_millis().ok()?))
        .ok_or(AppError::Unauthorized("Invalid or expired OAuth state"))?;
    if expected_nonce.as_deref() != Some(nonce.as_str()) {
        return Err(AppError::Unauthorized("OAuth state does not match this browser"));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("Missing authorization code".to_string()))?;

    let profile = state.google_oauth.exchange_code(&code).await?;
    let user = exchange_credential(&state.db, &profile).await?;

    tracing::info!(
        user_id = %user.id,
        display_name = %user.display_name,
        "OAuth login successful"
    );

    create_session_token(&user.id, secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))
}

/// Logout - clear the session cookie and go back to the frontend.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(session_removal_cookie(state.config.secure_cookies()));
    (jar, Redirect::temporary("/"))
}

/// Summary of the logged-in user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub display_name: String,
}

async fn current_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Json<CurrentUserResponse>> {
    let user = resolve_session(&state, &jar, &headers)
        .await?
        .ok_or(AppError::Unauthorized("Not authenticated"))?;

    Ok(Json(CurrentUserResponse {
        id: user.id,
        display_name: user.display_name,
    }))
}

/// Sign `nonce` and the issue time into an opaque OAuth `state` value.
///
/// Format before encoding: `nonce|timestamp_hex|signature_hex`.
pub fn sign_state(nonce: &str, issued_at_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", nonce, issued_at_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify an OAuth `state` and return its nonce.
///
/// Rejects bad signatures and states older than ten minutes.
pub fn verify_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let mut parts = state_str.splitn(3, '|');
    let (nonce, timestamp_hex, signature_hex) = (parts.next()?, parts.next()?, parts.next()?);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", nonce, timestamp_hex).as_bytes());
    if mac.verify_slice(&hex::decode(signature_hex).ok()?).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_at = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_at) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"secret_key";
    const NOW: u128 = 1_760_000_000_000;

    #[test]
    fn test_verify_state_success() {
        let state = sign_state("abc123", NOW, SECRET).unwrap();
        assert_eq!(verify_state(&state, SECRET, NOW + 1_000), Some("abc123".to_string()));
    }

    #[test]
    fn test_verify_state_wrong_secret() {
        let state = sign_state("abc123", NOW, SECRET).unwrap();
        assert_eq!(verify_state(&state, b"wrong_key", NOW), None);
    }

    #[test]
    fn test_verify_state_tampered_nonce() {
        let state = sign_state("abc123", NOW, SECRET).unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&state).unwrap()).unwrap();
        let tampered = URL_SAFE_NO_PAD.encode(decoded.replacen("abc123", "evil00", 1));

        assert_eq!(verify_state(&tampered, SECRET, NOW), None);
    }

    #[test]
    fn test_verify_state_expired() {
        let state = sign_state("abc123", NOW, SECRET).unwrap();
        assert_eq!(verify_state(&state, SECRET, NOW + STATE_MAX_AGE_MS + 1), None);
    }

    #[test]
    fn test_verify_state_malformed() {
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_state(&encoded_state, SECRET, NOW), None);
        assert_eq!(verify_state("%%%", SECRET, NOW), None);
    }
}
