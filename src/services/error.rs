use std::collections::HashMap;
use std::fmt::Display;

use crate::database::manager::DatabaseError;

/// Failures surfaced by the service layer. Every variant is terminal for the
/// request; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    InvalidRequest {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl ServiceError {
    pub fn not_found(resource: &str, id: impl Display) -> Self {
        ServiceError::NotFound(format!("{resource} not found with id '{id}'"))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ServiceError::Unauthenticated(message.into())
    }

    #[cfg(test)]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.into());
        ServiceError::InvalidRequest {
            message: "Validation failed".to_string(),
            field_errors,
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            // Normally caught by the existence checks first; this covers races
            DatabaseError::UniqueViolation(constraint) if constraint.contains("email") => {
                ServiceError::conflict("Email already exists")
            }
            DatabaseError::UniqueViolation(constraint) if constraint.contains("username") => {
                ServiceError::conflict("Username already exists")
            }
            DatabaseError::UniqueViolation(_) => ServiceError::conflict("Resource already exists"),
            DatabaseError::MissingReference(_) => ServiceError::NotFound("Referenced user not found".to_string()),
            other => ServiceError::Database(other),
        }
    }
}

/// Collects per-field validation failures
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        // First failure per field wins
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::InvalidRequest {
                message: "Validation failed".to_string(),
                field_errors: self.errors,
            })
        }
    }
}
