//! Database layer (Firestore).

pub mod firestore;
mod memory;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const USER_EXTERNAL_IDS: &str = "user_external_ids";
    pub const RECORDS: &str = "records";
}

/// Generate a 24-character hex document ID from 12 random bytes.
pub fn new_document_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 12];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Persistence("Failed to generate document ID".to_string()))?;
    Ok(hex::encode(bytes))
}
