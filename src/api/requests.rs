// Request bodies. Create payloads use `Option` fields so missing values come
// back as field errors rather than JSON decode failures; update payloads use
// `Patch` so an omitted field is never mistaken for a cleared one.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{NewProject, ProjectChanges};
use crate::services::error::{FieldErrors, ServiceError};
use crate::types::{Patch, Priority, ProjectStatus, Role};

const MAX_PROJECT_NAME: usize = 100;
const MIN_PASSWORD: usize = 6;
const MAX_PERSON_NAME: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(alias = "assigneeId")]
    pub assigned_to_id: Option<Uuid>,
    pub priority: Option<Priority>,
    pub status: Option<ProjectStatus>,
}

impl CreateProjectRequest {
    /// Check required fields; `end_date` must fall strictly after `today`
    pub fn validate(self, today: NaiveDate) -> Result<NewProject, ServiceError> {
        let mut errors = FieldErrors::new();

        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if let Err(msg) = validate_project_name(&name) {
            errors.add("name", msg);
        }
        errors.check(self.start_date.is_some(), "startDate", "Start date is required");
        match self.end_date {
            None => errors.add("endDate", "End date is required"),
            Some(end) if end <= today => errors.add("endDate", "End date must be in the future"),
            Some(_) => {}
        }
        errors.check(self.priority.is_some(), "priority", "Priority is required");
        errors.into_result()?;

        match (self.start_date, self.end_date, self.priority) {
            (Some(start_date), Some(end_date), Some(priority)) => Ok(NewProject {
                name,
                description: self.description,
                start_date,
                end_date,
                assignee_id: self.assigned_to_id,
                priority,
                status: self.status.unwrap_or_default(),
            }),
            _ => Err(ServiceError::Internal("validated project request is incomplete".to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    pub end_date: Patch<NaiveDate>,
    #[serde(default, alias = "assigneeId")]
    pub assigned_to_id: Patch<Option<Uuid>>,
    #[serde(default)]
    pub priority: Patch<Priority>,
}

impl UpdateProjectRequest {
    /// Validate only the fields that are present
    pub fn validate(self, today: NaiveDate) -> Result<ProjectChanges, ServiceError> {
        let mut errors = FieldErrors::new();

        let name = match self.name {
            Patch::Set(name) => {
                let name = name.trim().to_string();
                if let Err(msg) = validate_project_name(&name) {
                    errors.add("name", msg);
                }
                Patch::Set(name)
            }
            Patch::Absent => Patch::Absent,
        };
        if let Patch::Set(end) = self.end_date {
            errors.check(end > today, "endDate", "End date must be in the future");
        }
        errors.into_result()?;

        Ok(ProjectChanges {
            name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            priority: self.priority,
            assignee_id: self.assigned_to_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectStatusRequest {
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = FieldErrors::new();
        if let Err(msg) = validate_username_format(self.username.as_deref().unwrap_or_default()) {
            errors.add("username", msg);
        }
        if let Err(msg) = validate_email_format(self.email.as_deref().unwrap_or_default()) {
            errors.add("email", msg);
        }
        if let Err(msg) = validate_password(self.password.as_deref().unwrap_or_default()) {
            errors.add("password", msg);
        }
        if let Some(first_name) = self.first_name.as_deref() {
            if let Err(msg) = validate_person_name(first_name) {
                errors.add("firstName", msg);
            }
        }
        if let Some(last_name) = self.last_name.as_deref() {
            if let Err(msg) = validate_person_name(last_name) {
                errors.add("lastName", msg);
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub first_name: Patch<Option<String>>,
    #[serde(default)]
    pub last_name: Patch<Option<String>>,
    #[serde(default)]
    pub role: Patch<Role>,
    #[serde(default)]
    pub enabled: Patch<bool>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = FieldErrors::new();
        if let Some(email) = self.email.as_set() {
            if let Err(msg) = validate_email_format(email) {
                errors.add("email", msg);
            }
        }
        if let Some(password) = self.password.as_set() {
            if let Err(msg) = validate_password(password) {
                errors.add("password", msg);
            }
        }
        if let Some(Some(first_name)) = self.first_name.as_set() {
            if let Err(msg) = validate_person_name(first_name) {
                errors.add("firstName", msg);
            }
        }
        if let Some(Some(last_name)) = self.last_name.as_set() {
            if let Err(msg) = validate_person_name(last_name) {
                errors.add("lastName", msg);
            }
        }
        errors.into_result()
    }

    /// Fields only a manager may touch
    pub fn changes_privileges(&self) -> bool {
        !self.role.is_absent() || !self.enabled.is_absent()
    }
}

fn validate_project_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Project name is required".to_string());
    }
    if name.chars().count() > MAX_PROJECT_NAME {
        return Err(format!("Project name must be at most {MAX_PROJECT_NAME} characters"));
    }
    Ok(())
}

fn validate_username_format(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }

    if username.len() > 50 {
        return Err("Username must be at most 50 characters".to_string());
    }

    // Allow alphanumeric, underscore, hyphen
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err("Username can only contain letters, numbers, underscore, and hyphen".to_string());
    }

    if !username.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }

    Ok(())
}

fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.len() > 100 {
        return Err("Email must be at most 100 characters".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD {
        return Err(format!("Password must be at least {MIN_PASSWORD} characters"));
    }
    Ok(())
}

fn validate_person_name(name: &str) -> Result<(), String> {
    if name.chars().count() > MAX_PERSON_NAME {
        return Err(format!("Name must be at most {MAX_PERSON_NAME} characters"));
    }
    Ok(())
}
