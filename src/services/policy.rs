//! Authorization decisions. Pure functions over the caller and the target;
//! no I/O and no errors. Services turn a `false` into `Forbidden`.

use uuid::Uuid;

use crate::database::models::Project;
use crate::types::Role;

/// Identity resolved from the current session, passed explicitly into every
/// service call. Unauthenticated requests never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

pub fn can_create_project(caller: &Caller) -> bool {
    caller.is_manager()
}

/// Full-field edit is manager only
pub fn can_edit_project(caller: &Caller) -> bool {
    can_create_project(caller)
}

pub fn can_delete_project(caller: &Caller) -> bool {
    can_create_project(caller)
}

/// Managers see everything; anyone else only what is assigned to them
pub fn can_view_project(caller: &Caller, project: &Project) -> bool {
    caller.is_manager() || project.is_assigned_to(&caller.username)
}

pub fn can_change_status(caller: &Caller, project: &Project) -> bool {
    can_view_project(caller, project)
}

pub fn can_edit_user(caller: &Caller, target_username: &str) -> bool {
    caller.is_manager() || caller.username == target_username
}

/// Creating, deleting, listing and inspecting other accounts, and changing
/// role or enabled flags
pub fn can_manage_users(caller: &Caller) -> bool {
    caller.is_manager()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Assignee;
    use crate::types::{Priority, ProjectStatus};
    use chrono::{NaiveDate, Utc};

    fn caller(username: &str, role: Role) -> Caller {
        Caller::new(Uuid::new_v4(), username, role)
    }

    fn project_for(assignee: Option<&str>) -> Project {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        Project {
            id: Uuid::new_v4(),
            name: "Migration".to_string(),
            description: None,
            start_date: date,
            end_date: date,
            assignee: assignee.map(|username| Assignee {
                id: Uuid::new_v4(),
                username: username.to_string(),
                display_name: username.to_string(),
            }),
            priority: Priority::High,
            status: ProjectStatus::NotStarted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_managers_create_edit_delete() {
        let manager = caller("boss", Role::Manager);
        let employee = caller("jdoe", Role::Employee);

        assert!(can_create_project(&manager));
        assert!(can_edit_project(&manager));
        assert!(can_delete_project(&manager));

        assert!(!can_create_project(&employee));
        assert!(!can_edit_project(&employee));
        assert!(!can_delete_project(&employee));
    }

    #[test]
    fn managers_view_every_project() {
        let manager = caller("boss", Role::Manager);
        for assignee in [None, Some("jdoe"), Some("boss")] {
            let project = project_for(assignee);
            assert!(can_view_project(&manager, &project));
            assert!(can_change_status(&manager, &project));
        }
    }

    #[test]
    fn employees_view_only_their_assignments() {
        let employee = caller("jdoe", Role::Employee);

        assert!(can_view_project(&employee, &project_for(Some("jdoe"))));
        assert!(can_change_status(&employee, &project_for(Some("jdoe"))));

        assert!(!can_view_project(&employee, &project_for(Some("other"))));
        assert!(!can_view_project(&employee, &project_for(None)));
        assert!(!can_change_status(&employee, &project_for(Some("other"))));
    }

    #[test]
    fn users_edit_themselves_managers_edit_anyone() {
        let employee = caller("jdoe", Role::Employee);
        let manager = caller("boss", Role::Manager);

        assert!(can_edit_user(&employee, "jdoe"));
        assert!(!can_edit_user(&employee, "someone"));
        assert!(can_edit_user(&manager, "someone"));
        assert!(!can_manage_users(&employee));
        assert!(can_manage_users(&manager));
    }
}
