// Public handlers: token acquisition only
pub mod auth;
