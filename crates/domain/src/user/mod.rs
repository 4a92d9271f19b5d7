//! Registered shop users.
//!
//! Credentials and roles live with the identity provider; this directory only
//! keeps the profile data the shop lists and sorts.

use std::collections::HashMap;
use std::sync::Arc;

use common::{ErrorKind, UserId};
use ordering::{Field, FieldTable, SortValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Profile data supplied at registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid user: {0}")]
    Validation(String),
}

impl UserError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

/// Sortable user fields.
pub static USER_FIELDS: FieldTable<User> = FieldTable::new(
    "User",
    &[
        Field::new("id", |u: &User| SortValue::from(u.id.as_uuid())),
        Field::new("username", |u: &User| SortValue::from(u.username.as_str())),
        Field::new("firstname", |u: &User| {
            SortValue::from(u.first_name.as_str())
        }),
        Field::new("lastname", |u: &User| SortValue::from(u.last_name.as_str())),
        Field::new("middlename", |u: &User| {
            SortValue::opt_text(u.middle_name.as_deref())
        }),
        Field::new("email", |u: &User| SortValue::opt_text(u.email.as_deref())),
        Field::new("phone", |u: &User| SortValue::opt_text(u.phone.as_deref())),
    ],
    |a: &User, b: &User| a.id.cmp(&b.id),
);

/// In-memory user directory. Clones share the same users.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn register(&self, new_user: NewUser) -> Result<User, UserError> {
        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(UserError::Validation("username must not be empty".into()));
        }

        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(UserError::UsernameTaken(username));
        }

        let user = User {
            id: UserId::new(),
            username,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            middle_name: new_user.middle_name,
            email: new_user.email,
            phone: new_user.phone,
        };
        users.insert(user.id, user.clone());
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn get(&self, id: UserId) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    /// Users whose username contains `username_like` (case-insensitive).
    pub async fn list(&self, username_like: Option<&str>, order_by: Option<&str>) -> Vec<User> {
        let needle = username_like.map(|s| s.trim().to_lowercase());
        let users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| {
                needle
                    .as_deref()
                    .is_none_or(|n| u.username.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        ordering::sort(users, order_by, &USER_FIELDS)
    }
}
