// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth 2.0 client for the login flow.

use crate::config::Config;
use crate::error::AppError;
use crate::services::upstream::send_json;
use serde::Deserialize;

const SERVICE: &str = "Google";
const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid profile email";

/// Profile returned by the identity provider after a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleProfile {
    /// Provider subject ID
    pub id: String,
    pub display_name: String,
    pub emails: Vec<String>,
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    callback_url: String,
}

impl GoogleOAuthClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            callback_url: config.google_callback_url.clone(),
        }
    }

    fn client_id(&self) -> Result<&str, AppError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("GOOGLE_CLIENT_ID is not set")))
    }

    /// URL of Google's consent screen carrying the signed `state`.
    pub fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTHORIZE_URL,
            urlencoding::encode(self.client_id()?),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an authorization code for the user's profile.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, AppError> {
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("GOOGLE_CLIENT_SECRET is not set")))?;

        let tokens: TokenResponse = send_json(
            SERVICE,
            self.http.post(TOKEN_URL).form(&[
                ("code", code),
                ("client_id", self.client_id()?),
                ("client_secret", client_secret),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ]),
        )
        .await?;

        let info: UserInfo = send_json(
            SERVICE,
            self.http.get(USERINFO_URL).bearer_auth(&tokens.access_token),
        )
        .await?;

        Ok(info.into_profile())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

impl UserInfo {
    fn into_profile(self) -> GoogleProfile {
        let display_name = self
            .name
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.sub.clone());

        GoogleProfile {
            id: self.sub,
            display_name,
            emails: self.email.into_iter().collect(),
        }
    }
}
