//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Language, UserRole};

/// A staff account
///
/// Account lifecycle (creation, password handling) is owned by the
/// administration screens; the engines only consume the id and role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub preferred_language: Language,
    pub created_at: DateTime<Utc>,
}
