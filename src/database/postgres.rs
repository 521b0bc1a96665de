use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::project::ProjectRow;
use crate::database::models::user::UserRow;
use crate::database::models::{NewProject, NewUser, Project, ProjectChanges, User, UserChanges};
use crate::database::pagination::{Page, PageRequest};
use crate::database::repository::{ProjectStore, UserStore};
use crate::types::{Patch, ProjectStatus};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, role, enabled, created_at, updated_at";

const PROJECT_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.description, p.start_date, p.end_date, p.assignee_id,
        u.username AS assignee_username,
        u.first_name AS assignee_first_name,
        u.last_name AS assignee_last_name,
        p.priority, p.status, p.created_at, p.updated_at
    FROM projects p
    LEFT JOIN users u ON u.id = p.assignee_id
"#;

/// sqlx-backed implementation of both stores over one pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_project<'e, E>(executor: E, id: Uuid) -> Result<Option<Project>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("{PROJECT_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        row.map(Project::try_from).transpose()
    }

    async fn fetch_project_page(
        &self,
        assignee_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<Project>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM projects WHERE ($1::uuid IS NULL OR assignee_id = $1)",
        )
        .bind(assignee_id)
        .fetch_one(&mut *tx)
        .await?;

        let sql = format!(
            "{PROJECT_SELECT} WHERE ($1::uuid IS NULL OR p.assignee_id = $1) \
             ORDER BY p.created_at, p.id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(assignee_id)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let content = rows
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, page, total.max(0) as u64))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, role, enabled) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(user.enabled)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?;
        User::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DatabaseError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DatabaseError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let content = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, page, total.max(0) as u64))
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<Option<User>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");
        if let Patch::Set(email) = &changes.email {
            qb.push(", email = ").push_bind(email.clone());
        }
        if let Patch::Set(hash) = &changes.password_hash {
            qb.push(", password_hash = ").push_bind(hash.clone());
        }
        if let Patch::Set(first_name) = &changes.first_name {
            qb.push(", first_name = ").push_bind(first_name.clone());
        }
        if let Patch::Set(last_name) = &changes.last_name {
            qb.push(", last_name = ").push_bind(last_name.clone());
        }
        if let Patch::Set(role) = &changes.role {
            qb.push(", role = ").push_bind(role.as_str());
        }
        if let Patch::Set(enabled) = &changes.enabled {
            qb.push(", enabled = ").push_bind(*enabled);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(USER_COLUMNS);

        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?;
        row.map(User::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        // projects.assignee_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn insert(&self, project: NewProject) -> Result<Project, DatabaseError> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO projects (id, name, description, start_date, end_date, assignee_id, priority, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.assignee_id)
        .bind(project.priority.as_str())
        .bind(project.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_write)?;

        let created = Self::fetch_project(&mut *tx, id)
            .await?
            .ok_or(DatabaseError::Sqlx(sqlx::Error::RowNotFound))?;
        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DatabaseError> {
        Self::fetch_project(&self.pool, id).await
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Project>, DatabaseError> {
        self.fetch_project_page(None, page).await
    }

    async fn find_by_assignee(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Project>, DatabaseError> {
        self.fetch_project_page(Some(user_id), page).await
    }

    async fn update(&self, id: Uuid, changes: &ProjectChanges) -> Result<Option<Project>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = now()");
        if let Patch::Set(name) = &changes.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Patch::Set(description) = &changes.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Patch::Set(start_date) = &changes.start_date {
            qb.push(", start_date = ").push_bind(*start_date);
        }
        if let Patch::Set(end_date) = &changes.end_date {
            qb.push(", end_date = ").push_bind(*end_date);
        }
        if let Patch::Set(priority) = &changes.priority {
            qb.push(", priority = ").push_bind(priority.as_str());
        }
        if let Patch::Set(assignee_id) = &changes.assignee_id {
            qb.push(", assignee_id = ").push_bind(*assignee_id);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING id");

        let mut tx = self.pool.begin().await?;
        let updated = qb
            .build_query_as::<(Uuid,)>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::from_write)?;
        if updated.is_none() {
            return Ok(None);
        }

        let project = Self::fetch_project(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(project)
    }

    async fn set_status(&self, id: Uuid, status: ProjectStatus) -> Result<Option<Project>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE projects SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let project = Self::fetch_project(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(project)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
