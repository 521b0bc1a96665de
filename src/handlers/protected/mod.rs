// Protected handlers. Every route here sits behind `jwt_auth_middleware`
// and receives the resolved `Caller` as an extractor.
pub mod projects;
pub mod users;
