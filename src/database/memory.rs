use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Assignee, NewProject, NewUser, Project, ProjectChanges, User, UserChanges};
use crate::database::pagination::{Page, PageRequest};
use crate::database::repository::{ProjectStore, UserStore};
use crate::types::{Priority, ProjectStatus};

/// Project as kept in memory: the assignee is a bare id, resolved on read
#[derive(Debug, Clone)]
struct StoredProject {
    id: Uuid,
    name: String,
    description: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    assignee_id: Option<Uuid>,
    priority: Priority,
    status: ProjectStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    // Insertion order doubles as the listing order
    users: Vec<User>,
    projects: Vec<StoredProject>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn resolve(&self, stored: &StoredProject) -> Project {
        let assignee = stored
            .assignee_id
            .and_then(|id| self.user(id))
            .map(|user| Assignee {
                id: user.id,
                username: user.username.clone(),
                display_name: user.display_name(),
            });

        Project {
            id: stored.id,
            name: stored.name.clone(),
            description: stored.description.clone(),
            start_date: stored.start_date,
            end_date: stored.end_date,
            assignee,
            priority: stored.priority,
            status: stored.status,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn check_assignee(&self, assignee_id: Option<Uuid>) -> Result<(), DatabaseError> {
        match assignee_id {
            Some(id) if self.user(id).is_none() => {
                Err(DatabaseError::MissingReference("projects_assignee_id_fkey".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Process-local store for development runs and tests. Each trait call holds
/// the lock for its whole duration, which makes every operation atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            enabled: user.enabled,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.email == email))
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(Page::slice(tables.users.clone(), page))
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = changes.email.as_set() {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        changes.apply(user);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        for project in tables.projects.iter_mut().filter(|p| p.assignee_id == Some(id)) {
            project.assignee_id = None;
        }
        Ok(true)
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_assignee(project.assignee_id)?;

        let now = Utc::now();
        let stored = StoredProject {
            id: Uuid::new_v4(),
            name: project.name,
            description: project.description,
            start_date: project.start_date,
            end_date: project.end_date,
            assignee_id: project.assignee_id,
            priority: project.priority,
            status: project.status,
            created_at: now,
            updated_at: now,
        };
        let created = tables.resolve(&stored);
        tables.projects.push(stored);
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.resolve(p)))
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        let all = tables.projects.iter().map(|p| tables.resolve(p)).collect();
        Ok(Page::slice(all, page))
    }

    async fn find_by_assignee(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        let mine = tables
            .projects
            .iter()
            .filter(|p| p.assignee_id == Some(user_id))
            .map(|p| tables.resolve(p))
            .collect();
        Ok(Page::slice(mine, page))
    }

    async fn update(&self, id: Uuid, changes: &ProjectChanges) -> Result<Option<Project>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(assignee_id) = changes.assignee_id.as_set() {
            tables.check_assignee(*assignee_id)?;
        }

        let Some(stored) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        changes.name.apply_to(&mut stored.name);
        changes.description.apply_to(&mut stored.description);
        changes.start_date.apply_to(&mut stored.start_date);
        changes.end_date.apply_to(&mut stored.end_date);
        changes.priority.apply_to(&mut stored.priority);
        changes.assignee_id.apply_to(&mut stored.assignee_id);
        stored.updated_at = Utc::now();

        let stored = stored.clone();
        Ok(Some(tables.resolve(&stored)))
    }

    async fn set_status(&self, id: Uuid, status: ProjectStatus) -> Result<Option<Project>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        stored.status = status;
        stored.updated_at = Utc::now();

        let stored = stored.clone();
        Ok(Some(tables.resolve(&stored)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        Ok(tables.projects.len() < before)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn new_project(assignee_id: Option<Uuid>) -> NewProject {
        let today = Utc::now().date_naive();
        NewProject {
            name: "Website".to_string(),
            description: None,
            start_date: today,
            end_date: today + chrono::Duration::days(30),
            assignee_id,
            priority: Priority::Medium,
            status: ProjectStatus::default(),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_username() {
        let store = MemoryStore::new();
        UserStore::insert(&store, NewUser::new("jdoe", "a@example.com", "h", None)).await.unwrap();
        let err = UserStore::insert(&store, NewUser::new("jdoe", "b@example.com", "h", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn resolves_assignee_display_name() {
        let store = MemoryStore::new();
        let user = UserStore::insert(
            &store,
            NewUser::new("jdoe", "jdoe@example.com", "h", Some(Role::Employee))
                .with_names(Some("Jane".into()), Some("Doe".into())),
        )
        .await
        .unwrap();

        let project = ProjectStore::insert(&store, new_project(Some(user.id))).await.unwrap();
        let assignee = project.assignee.unwrap();
        assert_eq!(assignee.username, "jdoe");
        assert_eq!(assignee.display_name, "Jane Doe");
    }

    #[tokio::test]
    async fn unknown_assignee_is_a_missing_reference() {
        let store = MemoryStore::new();
        let err = ProjectStore::insert(&store, new_project(Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::MissingReference(_)));
    }

    #[tokio::test]
    async fn deleting_user_unassigns_projects() {
        let store = MemoryStore::new();
        let user = UserStore::insert(&store, NewUser::new("jdoe", "jdoe@example.com", "h", None))
            .await
            .unwrap();
        let project = ProjectStore::insert(&store, new_project(Some(user.id))).await.unwrap();

        assert!(UserStore::delete(&store, user.id).await.unwrap());
        let project = ProjectStore::find_by_id(&store, project.id).await.unwrap().unwrap();
        assert!(project.assignee.is_none());
    }
}
