// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (identity provider accounts)
//! - Records (saved wellbeing scores, listed per owner)

use super::memory::MemoryStore;
use crate::db::{collections, new_document_id};
use crate::error::AppError;
use crate::models::{ExternalIdClaim, NewRecord, Record, User};
use crate::time_utils::now_rfc3339;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
    Offline,
}

/// Document store client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Connect to Firestore when a project is given.
    ///
    /// Without a project the store is offline: the server starts, but every
    /// store call fails.
    pub async fn connect(project_id: Option<&str>) -> Result<Self, AppError> {
        match project_id {
            Some(project_id) => Self::new(project_id).await,
            None => {
                tracing::warn!("GCP_PROJECT_ID not set, running without a document store");
                Ok(Self::new_mock())
            }
        }
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a store backed by process memory, for tests.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    /// Make record reads and writes fail on the in-memory store.
    ///
    /// Users stay available, so requests still pass the session gate. Has no
    /// effect on other backends.
    pub fn set_records_unavailable(&self, unavailable: bool) {
        if let Backend::Memory(store) = &self.backend {
            store.set_records_unavailable(unavailable);
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Persistence("Database not connected (offline mode)".to_string())
    }

    fn records_unavailable() -> AppError {
        AppError::Persistence("Records collection unavailable".to_string())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by local ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
                .map_err(|e| AppError::Persistence(e.to_string())),
            Backend::Memory(store) => Ok(store.get_user(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get a user by identity provider subject.
    pub async fn find_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let claim: Option<ExternalIdClaim> = client
                    .fluent()
                    .select()
                    .by_id_in(collections::USER_EXTERNAL_IDS)
                    .obj()
                    .one(claim_document_id(external_id))
                    .await
                    .map_err(|e| AppError::Persistence(e.to_string()))?;

                match claim {
                    Some(claim) => self.get_user(&claim.user_id).await,
                    None => Ok(None),
                }
            }
            Backend::Memory(store) => Ok(store.find_user_by_external_id(external_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Look up a user by external ID, creating it on first login.
    pub async fn find_or_create_user(
        &self,
        external_id: &str,
        display_name: &str,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        if let Some(user) = self.find_user_by_external_id(external_id).await? {
            tracing::info!(user_id = %user.id, "User found and authenticated");
            return Ok(user);
        }

        let user = User {
            id: new_document_id()?,
            external_id: external_id.to_string(),
            display_name: display_name.to_string(),
            email: email.map(str::to_string),
            created_at: now_rfc3339(),
        };

        let (user, created) = match &self.backend {
            Backend::Firestore(client) => self.create_claimed_user(client, user).await?,
            Backend::Memory(store) => store.insert_user_if_absent(user),
            Backend::Offline => return Err(Self::offline()),
        };

        if created {
            tracing::info!(user_id = %user.id, "New user created and authenticated");
        }
        Ok(user)
    }

    /// Write `user` together with a create-only claim on its external ID.
    ///
    /// Both writes commit atomically. If a concurrent login claimed the
    /// external ID first, the commit fails and that login's user is returned.
    async fn create_claimed_user(
        &self,
        client: &firestore::FirestoreDb,
        user: User,
    ) -> Result<(User, bool), AppError> {
        let claim = ExternalIdClaim {
            user_id: user.id.clone(),
        };

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Persistence(format!("Failed to add user to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::USER_EXTERNAL_IDS)
            .precondition(firestore::FirestoreWritePrecondition::Exists(false))
            .document_id(claim_document_id(&user.external_id))
            .object(&claim)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Persistence(format!("Failed to add claim to transaction: {}", e))
            })?;

        match transaction.commit().await {
            Ok(_) => Ok((user, true)),
            Err(e) => match self.find_user_by_external_id(&user.external_id).await? {
                Some(existing) => {
                    tracing::info!(
                        user_id = %existing.id,
                        "Concurrent first login, using existing user"
                    );
                    Ok((existing, false))
                }
                None => Err(AppError::Persistence(format!(
                    "Transaction commit failed: {}",
                    e
                ))),
            },
        }
    }

    // ─── Record Operations ───────────────────────────────────────

    /// Store a new record owned by `user_id`.
    pub async fn create_record(&self, user_id: &str, new: NewRecord) -> Result<Record, AppError> {
        let record = new.into_record(
            new_document_id()?,
            user_id.to_string(),
            now_rfc3339(),
        );

        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::RECORDS)
                    .document_id(&record.id)
                    .object(&record)
                    .execute()
                    .await
                    .map_err(|e| AppError::Persistence(e.to_string()))?;
            }
            Backend::Memory(store) if store.records_available() => {
                store.insert_record(record.clone())
            }
            Backend::Memory(_) => return Err(Self::records_unavailable()),
            Backend::Offline => return Err(Self::offline()),
        }

        tracing::info!(
            user_id,
            record_id = %record.id,
            city = %record.city,
            "Record saved"
        );
        Ok(record)
    }

    /// All records owned by `user_id`, highest total score first.
    pub async fn list_records_for_user(&self, user_id: &str) -> Result<Vec<Record>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .from(collections::RECORDS)
                .filter(|q| q.for_all([q.field("userId").eq(user_id)]))
                .order_by([(
                    "totalScore",
                    firestore::FirestoreQueryDirection::Descending,
                )])
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Persistence(e.to_string())),
            Backend::Memory(store) if store.records_available() => {
                Ok(store.records_for_user(user_id))
            }
            Backend::Memory(_) => Err(Self::records_unavailable()),
            Backend::Offline => Err(Self::offline()),
        }
    }
}

/// Document ID of the claim on `external_id`.
fn claim_document_id(external_id: &str) -> String {
    urlencoding::encode(external_id).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WellbeingFactors;

    fn new_record(city: &str, total_score: f64) -> NewRecord {
        NewRecord {
            city: city.to_string(),
            country: "Testland".to_string(),
            total_score,
            wellbeing_factors: WellbeingFactors {
                population_density: 1.0,
                air_quality: 2.0,
                weather_comfort: 3.0,
            },
        }
    }

    #[tokio::test]
    async fn find_or_create_user_is_keyed_by_external_id() {
        let db = FirestoreDb::new_in_memory();

        let first = db
            .find_or_create_user("google-1", "Ada", Some("ada@example.com"))
            .await
            .unwrap();
        let again = db
            .find_or_create_user("google-1", "Ada Renamed", None)
            .await
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(again.display_name, "Ada");
        assert_eq!(db.get_user(&first.id).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn records_are_listed_per_owner_by_score() {
        let db = FirestoreDb::new_in_memory();

        for score in [40.0, 90.0, 65.0] {
            db.create_record("owner", new_record("A", score)).await.unwrap();
        }
        db.create_record("someone-else", new_record("B", 100.0))
            .await
            .unwrap();

        let scores: Vec<f64> = db
            .list_records_for_user("owner")
            .await
            .unwrap()
            .iter()
            .map(|r| r.total_score)
            .collect();

        assert_eq!(scores, vec![90.0, 65.0, 40.0]);
    }

    #[tokio::test]
    async fn connect_without_project_is_offline() {
        let db = FirestoreDb::connect(None).await.unwrap();

        assert!(matches!(
            db.create_record("owner", new_record("A", 1.0)).await,
            Err(AppError::Persistence(_))
        ));
        assert!(matches!(
            db.find_or_create_user("google-1", "Ada", None).await,
            Err(AppError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn record_outage_keeps_users_available() {
        let db = FirestoreDb::new_in_memory();
        let user = db.find_or_create_user("google-1", "Ada", None).await.unwrap();
        db.set_records_unavailable(true);

        assert_eq!(db.get_user(&user.id).await.unwrap(), Some(user.clone()));
        assert!(matches!(
            db.create_record(&user.id, new_record("A", 1.0)).await,
            Err(AppError::Persistence(_))
        ));
        assert!(matches!(
            db.list_records_for_user(&user.id).await,
            Err(AppError::Persistence(_))
        ));

        db.set_records_unavailable(false);
        assert!(db.list_records_for_user(&user.id).await.unwrap().is_empty());
    }

    #[test]
    fn claim_ids_are_path_safe() {
        assert_eq!(claim_document_id("1234567890"), "1234567890");
        assert_eq!(claim_document_id("a/b"), "a%2Fb");
    }

    #[tokio::test]
    async fn offline_store_reports_persistence_errors() {
        let db = FirestoreDb::new_mock();

        assert!(matches!(
            db.list_records_for_user("owner").await,
            Err(AppError::Persistence(_))
        ));
        assert!(matches!(
            db.create_record("owner", new_record("A", 1.0)).await,
            Err(AppError::Persistence(_))
        ));
    }
}
