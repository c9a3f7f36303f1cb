// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapping from identity provider profiles to local users.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::User;
use crate::services::google_oauth::GoogleProfile;

/// Find or create the local user for an authenticated provider profile.
pub async fn exchange_credential(
    db: &FirestoreDb,
    profile: &GoogleProfile,
) -> Result<User, AppError> {
    let external_id = profile.id.trim();
    if external_id.is_empty() {
        return Err(AppError::Unauthorized(
            "Unauthorized: identity provider returned no subject",
        ));
    }

    let email = profile.emails.first().map(String::as_str);
    db.find_or_create_user(external_id, &profile.display_name, email)
        .await
}
