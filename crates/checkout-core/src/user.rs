//! # User Types
//!
//! Registered users. Passwords are stored only as one-way hashes; the
//! hashing itself happens at the API layer so the core never sees a
//! plaintext credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Email (unique across users)
    pub email: String,

    /// bcrypt hash of the password; never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Last update
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user from an already-hashed password
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
