//! User accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
///
/// `password` holds the salted digest from [`crate::auth::hash_password`] and is never
/// part of the public view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub access_key: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Fields needed to create a user; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub access_key: String,
}

/// Serialized form returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub access_key: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            access_key: self.access_key.clone(),
            created_at: self.created_at,
            is_active: self.is_active,
        }
    }
}
