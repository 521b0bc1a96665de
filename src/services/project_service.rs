use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{CreateProjectRequest, ProjectDto, ProjectStatusRequest, UpdateProjectRequest};
use crate::database::models::Project;
use crate::database::{Page, PageRequest, ProjectStore, UserStore};
use crate::services::error::ServiceError;
use crate::services::policy::{self, Caller};
use crate::types::Patch;

/// Project operations with visibility and mutation rules applied.
/// Every call takes the caller explicitly; nothing is read from ambient state.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
    users: Arc<dyn UserStore>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectStore>, users: Arc<dyn UserStore>) -> Self {
        Self { projects, users }
    }

    pub async fn create(&self, request: CreateProjectRequest, caller: &Caller) -> Result<ProjectDto, ServiceError> {
        if !policy::can_create_project(caller) {
            warn!(user = %caller.username, "Project creation denied");
            return Err(ServiceError::forbidden("Only managers can create projects"));
        }

        let new_project = request.validate(today())?;
        if let Some(assignee_id) = new_project.assignee_id {
            self.require_user(assignee_id).await?;
        }

        let project = self.projects.insert(new_project).await?;
        info!(project_id = %project.id, by = %caller.username, "Project created");
        Ok(project.into())
    }

    /// Merge the fields present in `request` into the stored project
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateProjectRequest,
        caller: &Caller,
    ) -> Result<ProjectDto, ServiceError> {
        if !policy::can_edit_project(caller) {
            warn!(user = %caller.username, project_id = %id, "Project update denied");
            return Err(ServiceError::forbidden("Only managers can update projects"));
        }

        self.require_project(id).await?;
        let changes = request.validate(today())?;
        if let Patch::Set(Some(assignee_id)) = changes.assignee_id {
            self.require_user(assignee_id).await?;
        }

        let project = self
            .projects
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;
        info!(project_id = %id, by = %caller.username, "Project updated");
        Ok(project.into())
    }

    pub async fn delete(&self, id: Uuid, caller: &Caller) -> Result<(), ServiceError> {
        if !policy::can_delete_project(caller) {
            warn!(user = %caller.username, project_id = %id, "Project deletion denied");
            return Err(ServiceError::forbidden("Only managers can delete projects"));
        }

        if !self.projects.delete(id).await? {
            return Err(ServiceError::not_found("Project", id));
        }
        info!(project_id = %id, by = %caller.username, "Project deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid, caller: &Caller) -> Result<ProjectDto, ServiceError> {
        let project = self.require_project(id).await?;
        if !policy::can_view_project(caller, &project) {
            warn!(user = %caller.username, project_id = %id, "Project view denied");
            return Err(ServiceError::forbidden("You can only view your assigned projects"));
        }
        Ok(project.into())
    }

    /// Managers get every project; everyone else gets `list_mine`
    pub async fn list_all(&self, caller: &Caller, page: PageRequest) -> Result<Page<ProjectDto>, ServiceError> {
        if !caller.is_manager() {
            return self.list_mine(caller, page).await;
        }
        let projects = self.projects.find_all(page).await?;
        Ok(projects.map(ProjectDto::from))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: ProjectStatusRequest,
        caller: &Caller,
    ) -> Result<ProjectDto, ServiceError> {
        let project = self.require_project(id).await?;
        if !policy::can_change_status(caller, &project) {
            warn!(user = %caller.username, project_id = %id, "Project status change denied");
            return Err(ServiceError::forbidden(
                "You can only update status of your assigned projects",
            ));
        }

        let project = self
            .projects
            .set_status(id, request.status)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;
        info!(project_id = %id, status = %request.status, by = %caller.username, "Project status changed");
        Ok(project.into())
    }

    /// Projects assigned to the caller. A page past the end is empty but
    /// still reports the full total.
    pub async fn list_mine(&self, caller: &Caller, page: PageRequest) -> Result<Page<ProjectDto>, ServiceError> {
        let user = self
            .users
            .find_by_username(&caller.username)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let projects = self.projects.find_by_assignee(user.id, page).await?;
        Ok(projects.map(ProjectDto::from))
    }

    async fn require_project(&self, id: Uuid) -> Result<Project, ServiceError> {
        self.projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))
    }

    async fn require_user(&self, id: Uuid) -> Result<(), ServiceError> {
        match self.users.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("User", id)),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
