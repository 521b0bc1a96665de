use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::auth::password::hash_password_async;
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::{Page, PageRequest, UserStore};
use crate::services::error::ServiceError;
use crate::services::policy::{self, Caller};
use crate::types::Patch;

/// Account management. Managers administer every account; anyone may read
/// and edit their own profile.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn create(&self, request: CreateUserRequest, caller: &Caller) -> Result<UserDto, ServiceError> {
        if !policy::can_manage_users(caller) {
            warn!(user = %caller.username, "User creation denied");
            return Err(ServiceError::forbidden("Only managers can create users"));
        }
        request.validate()?;

        let CreateUserRequest {
            username,
            password,
            email,
            first_name,
            last_name,
            role,
        } = request;
        let (username, password, email) = (
            username.unwrap_or_default(),
            password.unwrap_or_default(),
            email.unwrap_or_default(),
        );

        if self.users.exists_by_username(&username).await? {
            return Err(ServiceError::conflict("Username already exists"));
        }
        if self.users.exists_by_email(&email).await? {
            return Err(ServiceError::conflict("Email already exists"));
        }

        let password_hash = hash_password_async(password)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let user = self
            .users
            .insert(NewUser::new(username, email, password_hash, role).with_names(first_name, last_name))
            .await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, by = %caller.username, "User created");
        Ok(user.into())
    }

    pub async fn update(&self, id: Uuid, request: UpdateUserRequest, caller: &Caller) -> Result<UserDto, ServiceError> {
        let existing = self.require_user(id).await?;
        if !policy::can_edit_user(caller, &existing.username) {
            warn!(user = %caller.username, target = %existing.username, "User update denied");
            return Err(ServiceError::forbidden("You can only update your own profile"));
        }
        if request.changes_privileges() && !policy::can_manage_users(caller) {
            warn!(user = %caller.username, "Role or status change denied");
            return Err(ServiceError::forbidden("Only managers can change roles or account status"));
        }
        request.validate()?;

        if let Some(email) = request.email.as_set() {
            if email != &existing.email && self.users.exists_by_email(email).await? {
                return Err(ServiceError::conflict("Email already exists"));
            }
        }

        let password_hash = match &request.password {
            Patch::Set(password) => Patch::Set(
                hash_password_async(password.clone())
                    .await
                    .map_err(|e| ServiceError::Internal(e.to_string()))?,
            ),
            Patch::Absent => Patch::Absent,
        };
        let changes = UserChanges {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
            enabled: request.enabled,
        };

        let user = self
            .users
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        info!(user_id = %id, by = %caller.username, "User updated");
        Ok(user.into())
    }

    pub async fn delete(&self, id: Uuid, caller: &Caller) -> Result<(), ServiceError> {
        if !policy::can_manage_users(caller) {
            warn!(user = %caller.username, target = %id, "User deletion denied");
            return Err(ServiceError::forbidden("Only managers can delete users"));
        }
        if !self.users.delete(id).await? {
            return Err(ServiceError::not_found("User", id));
        }
        info!(user_id = %id, by = %caller.username, "User deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid, caller: &Caller) -> Result<UserDto, ServiceError> {
        if !policy::can_manage_users(caller) {
            return Err(ServiceError::forbidden("Only managers can view other users"));
        }
        Ok(self.require_user(id).await?.into())
    }

    pub async fn list(&self, caller: &Caller, page: PageRequest) -> Result<Page<UserDto>, ServiceError> {
        if !policy::can_manage_users(caller) {
            return Err(ServiceError::forbidden("Only managers can list users"));
        }
        let users = self.users.find_all(page).await?;
        Ok(users.map(UserDto::from))
    }

    /// The caller's own account
    pub async fn current(&self, caller: &Caller) -> Result<UserDto, ServiceError> {
        self.users
            .find_by_username(&caller.username)
            .await?
            .map(UserDto::from)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    async fn require_user(&self, id: Uuid) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }
}
