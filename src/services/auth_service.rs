use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{LoginRequest, LoginResponse};
use crate::auth::password::verify_password_async;
use crate::auth::{decode_jwt, generate_jwt, Claims};
use crate::database::UserStore;
use crate::services::error::ServiceError;
use crate::services::policy::Caller;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Issues tokens and turns presented tokens back into a `Caller`
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    expiry_hours: u64,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            users,
            jwt_secret: jwt_secret.into(),
            expiry_hours,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let Some(user) = self.users.find_by_username(&request.username).await? else {
            warn!(username = %request.username, "Login failed: unknown user");
            return Err(ServiceError::unauthenticated(BAD_CREDENTIALS));
        };
        if !verify_password_async(request.password.clone(), user.password_hash.clone()).await {
            warn!(username = %request.username, "Login failed: wrong password");
            return Err(ServiceError::unauthenticated(BAD_CREDENTIALS));
        }
        if !user.enabled {
            warn!(username = %request.username, "Login refused: account disabled");
            return Err(ServiceError::unauthenticated("Account is disabled"));
        }

        let claims = Claims::new(user.username.clone(), user.id, user.role, self.expiry_hours)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let token = generate_jwt(&claims, &self.jwt_secret).map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!(username = %user.username, role = %user.role, "User logged in");
        Ok(LoginResponse {
            token,
            token_type: "Bearer",
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }

    /// Verify a bearer token and load the account it names. The role comes
    /// from the stored account, so demotions apply to live tokens.
    pub async fn resolve_identity(&self, token: &str) -> Result<Caller, ServiceError> {
        let claims = decode_jwt(token, &self.jwt_secret).map_err(|e| {
            warn!("Rejected token: {}", e);
            ServiceError::unauthenticated("Invalid or expired token")
        })?;

        let user = self
            .users
            .find_by_username(&claims.sub)
            .await?
            .filter(|user| user.id == claims.user_id)
            .ok_or_else(|| ServiceError::unauthenticated("User no longer exists"))?;
        if !user.enabled {
            return Err(ServiceError::forbidden("Account is disabled"));
        }

        Ok(Caller::new(user.id, user.username, user.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::database::models::{NewUser, UserChanges};
    use crate::database::MemoryStore;
    use crate::types::{Patch, Role};

    const SECRET: &str = "test-secret";

    async fn setup() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let hash = hash_password("secret1").unwrap();
        store
            .insert(NewUser::new("jdoe", "jdoe@example.com", hash, Some(Role::Employee)))
            .await
            .unwrap();
        (AuthService::new(store.clone(), SECRET, 1), store)
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn login_then_resolve() {
        let (auth, _) = setup().await;
        let response = auth.login(login("jdoe", "secret1")).await.unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.role, Role::Employee);

        let caller = auth.resolve_identity(&response.token).await.unwrap();
        assert_eq!(caller.username, "jdoe");
        assert_eq!(caller.user_id, response.id);
    }

    #[tokio::test]
    async fn bad_credentials_share_one_message() {
        let (auth, _) = setup().await;
        for (user, pass) in [("jdoe", "wrong"), ("nobody", "secret1")] {
            let err = auth.login(login(user, pass)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Unauthenticated(ref m) if m == BAD_CREDENTIALS));
        }
    }

    #[tokio::test]
    async fn disabled_accounts_cannot_log_in_or_use_tokens() {
        let (auth, store) = setup().await;
        let token = auth.login(login("jdoe", "secret1")).await.unwrap().token;

        let user = store.find_by_username("jdoe").await.unwrap().unwrap();
        let changes = UserChanges {
            enabled: Patch::Set(false),
            ..Default::default()
        };
        store.update(user.id, &changes).await.unwrap();

        assert!(matches!(
            auth.login(login("jdoe", "secret1")).await,
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(auth.resolve_identity(&token).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn role_is_read_from_store() {
        let (auth, store) = setup().await;
        let token = auth.login(login("jdoe", "secret1")).await.unwrap().token;

        let user = store.find_by_username("jdoe").await.unwrap().unwrap();
        let changes = UserChanges {
            role: Patch::Set(Role::Manager),
            ..Default::default()
        };
        store.update(user.id, &changes).await.unwrap();

        let caller = auth.resolve_identity(&token).await.unwrap();
        assert!(caller.is_manager());
    }

    #[tokio::test]
    async fn rejects_garbage_and_foreign_tokens() {
        let (auth, store) = setup().await;
        assert!(matches!(
            auth.resolve_identity("not-a-token").await,
            Err(ServiceError::Unauthenticated(_))
        ));

        let user = store.find_by_username("jdoe").await.unwrap().unwrap();
        let forged = generate_jwt(&Claims::new("jdoe".into(), user.id, Role::Manager, 1).unwrap(), "other-secret").unwrap();
        assert!(matches!(
            auth.resolve_identity(&forged).await,
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn oversized_token_lifetime_fails_login_cleanly() {
        let (_, store) = setup().await;
        let auth = AuthService::new(store, SECRET, 3_000_000_000_000_000);
        assert!(matches!(
            auth.login(login("jdoe", "secret1")).await,
            Err(ServiceError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn deleted_account_token_is_rejected() {
        let (auth, store) = setup().await;
        let response = auth.login(login("jdoe", "secret1")).await.unwrap();
        store.delete(response.id).await.unwrap();

        assert!(matches!(
            auth.resolve_identity(&response.token).await,
            Err(ServiceError::Unauthenticated(_))
        ));
    }
}
