use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProject, NewUser, Project, ProjectChanges, User, UserChanges};
use crate::database::pagination::{Page, PageRequest};
use crate::types::ProjectStatus;

/// Account storage. Every method is one atomic unit against the backing store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, DatabaseError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, DatabaseError>;
    async fn find_all(&self, page: PageRequest) -> Result<Page<User>, DatabaseError>;
    /// Applies `changes` and returns the new row, or `None` when `id` is unknown
    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, DatabaseError>;
    /// Removes the account and clears it from any project assignment.
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
    async fn count(&self) -> Result<u64, DatabaseError>;
}

/// Project storage. Reads resolve the assignee in the same round trip.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError>;
    async fn find_all(&self, page: PageRequest) -> Result<Page<Project>, DatabaseError>;
    async fn find_by_assignee(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Project>, DatabaseError>;
    /// Merges `changes` in a single atomic write; `None` when `id` is unknown
    async fn update(&self, id: Uuid, changes: &ProjectChanges) -> Result<Option<Project>, DatabaseError>;
    async fn set_status(&self, id: Uuid, status: ProjectStatus) -> Result<Option<Project>, DatabaseError>;
    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
    async fn ping(&self) -> Result<(), DatabaseError>;
}
