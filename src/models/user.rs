//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Local user ID (also used as document ID)
    pub id: String,
    /// Identity provider subject (Google account ID)
    pub external_id: String,
    /// Name shown in the UI
    pub display_name: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// When the user first logged in
    pub created_at: String,
}

/// Claim on an identity provider subject, keyed by the encoded external ID.
///
/// Created only if absent, in the same transaction as the user it names, so
/// an external ID maps to exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdClaim {
    pub user_id: String,
}
