pub mod requests;
pub mod responses;

pub use requests::{
    CreateProjectRequest, CreateUserRequest, LoginRequest, ProjectStatusRequest, UpdateProjectRequest,
    UpdateUserRequest,
};
pub use responses::{LoginResponse, ProjectDto, UserDto};
