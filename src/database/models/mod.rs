pub mod project;
pub mod user;

pub use project::{Assignee, NewProject, Project, ProjectChanges};
pub use user::{NewUser, User, UserChanges};
