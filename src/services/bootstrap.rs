use tracing::info;

use crate::auth::password::hash_password_async;
use crate::config::BootstrapConfig;
use crate::database::models::{NewUser, User};
use crate::database::UserStore;
use crate::services::error::ServiceError;
use crate::types::Role;

/// Create the configured manager account when no accounts exist yet.
/// Returns the account only when one was created.
pub async fn ensure_default_admin(
    users: &dyn UserStore,
    config: &BootstrapConfig,
) -> Result<Option<User>, ServiceError> {
    if !config.enabled || users.count().await? > 0 {
        return Ok(None);
    }

    let password_hash = hash_password_async(config.admin_password.clone())
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    let admin = NewUser::new(
        config.admin_username.clone(),
        config.admin_email.clone(),
        password_hash,
        Some(Role::Manager),
    )
    .with_names(Some("Admin".to_string()), Some("User".to_string()));

    let user = users.insert(admin).await?;
    info!(username = %user.username, "Created default manager account");
    Ok(Some(user))
}
