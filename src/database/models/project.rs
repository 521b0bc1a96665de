use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::display_name;
use crate::database::manager::DatabaseError;
use crate::types::{Patch, Priority, ProjectStatus};

/// The user a project points at, resolved at read time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assignee: Option<Assignee>,
    pub priority: Priority,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_assigned_to(&self, username: &str) -> bool {
        self.assignee
            .as_ref()
            .is_some_and(|assignee| assignee.username == username)
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assignee_id: Option<Uuid>,
    pub priority: Priority,
    pub status: ProjectStatus,
}

/// Column-level changes for an existing project. `Absent` columns keep their
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Patch<String>,
    pub description: Patch<Option<String>>,
    pub start_date: Patch<NaiveDate>,
    pub end_date: Patch<NaiveDate>,
    pub priority: Patch<Priority>,
    pub assignee_id: Patch<Option<Uuid>>,
}

#[derive(Debug, FromRow)]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assignee_id: Option<Uuid>,
    pub assignee_username: Option<String>,
    pub assignee_first_name: Option<String>,
    pub assignee_last_name: Option<String>,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DatabaseError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let assignee = match (row.assignee_id, row.assignee_username) {
            (Some(id), Some(username)) => Some(Assignee {
                id,
                display_name: display_name(
                    &username,
                    row.assignee_first_name.as_deref(),
                    row.assignee_last_name.as_deref(),
                ),
                username,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            assignee,
            priority: row.priority.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
