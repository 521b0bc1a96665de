pub mod auth_service;
pub mod bootstrap;
pub mod error;
pub mod policy;
pub mod project_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use bootstrap::ensure_default_admin;
pub use error::ServiceError;
pub use policy::Caller;
pub use project_service::ProjectService;
pub use user_service::UserService;
