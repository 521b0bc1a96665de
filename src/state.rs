use std::sync::Arc;

use crate::config::{AppConfig, PaginationConfig};
use crate::database::{MemoryStore, PageQuery, PageRequest, ProjectStore, UserStore};
use crate::services::{AuthService, ProjectService, UserService};

/// Shared handler state. Services hold the stores behind trait objects so the
/// same router runs against Postgres or the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub users: UserService,
    pub auth: AuthService,
    pub store: Arc<dyn ProjectStore>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(user_store: Arc<dyn UserStore>, project_store: Arc<dyn ProjectStore>, config: &AppConfig) -> Self {
        Self {
            projects: ProjectService::new(project_store.clone(), user_store.clone()),
            users: UserService::new(user_store.clone()),
            auth: AuthService::new(
                user_store,
                config.security.jwt_secret.clone(),
                config.security.jwt_expiry_hours,
            ),
            store: project_store,
            pagination: config.pagination.clone(),
        }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, config)
    }

    /// Clamp `?page=&size=` against the configured limits
    pub fn page(&self, query: PageQuery) -> PageRequest {
        PageRequest::from_query(query, &self.pagination)
    }
}
