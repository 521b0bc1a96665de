use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::{Patch, Role};

/// Stored account. Not `Serialize`; responses go through `UserDto`.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", or the username when no names are on file
    pub fn display_name(&self) -> String {
        display_name(&self.username, self.first_name.as_deref(), self.last_name.as_deref())
    }
}

pub(crate) fn display_name(username: &str, first: Option<&str>, last: Option<&str>) -> String {
    let full = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

/// Account about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub enabled: bool,
}

impl NewUser {
    /// Accounts without an explicit role become employees
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Option<Role>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            role: role.unwrap_or_default(),
            enabled: true,
        }
    }

    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }
}

/// Column-level changes for an existing account
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Patch<String>,
    pub password_hash: Patch<String>,
    pub first_name: Patch<Option<String>>,
    pub last_name: Patch<Option<String>>,
    pub role: Patch<Role>,
    pub enabled: Patch<bool>,
}

impl UserChanges {
    pub fn apply(&self, user: &mut User) {
        self.email.apply_to(&mut user.email);
        self.password_hash.apply_to(&mut user.password_hash);
        self.first_name.apply_to(&mut user.first_name);
        self.last_name.apply_to(&mut user.last_name);
        self.role.apply_to(&mut user.role);
        self.enabled.apply_to(&mut user.enabled);
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role.parse()?,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults_to_enabled_employee() {
        let user = NewUser::new("jdoe", "jdoe@example.com", "hash", None);
        assert_eq!(user.role, Role::Employee);
        assert!(user.enabled);

        let boss = NewUser::new("boss", "boss@example.com", "hash", Some(Role::Manager));
        assert_eq!(boss.role, Role::Manager);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(display_name("jdoe", Some("Jane"), Some("Doe")), "Jane Doe");
        assert_eq!(display_name("jdoe", Some("Jane"), None), "Jane");
        assert_eq!(display_name("jdoe", None, None), "jdoe");
    }
}
