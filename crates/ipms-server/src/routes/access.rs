//! Project access checks shared by the project-scoped resources.

use ipms_core::models::Project;
use ipms_store::Connection;
use ipms_store::repositories::{Access, ProjectRepo};

use crate::error::{ApiError, ApiResult};

/// Message for a member attempting an owner-only change.
pub const NOT_OWNER: &str = "Not authorized to modify this project";

/// The project if the caller owns it or is a member; 404 otherwise.
pub fn readable(conn: &Connection, project_id: i64, user_id: i64) -> ApiResult<Project> {
    ProjectRepo::get_accessible(conn, project_id, user_id)?
        .map(|(project, _)| project)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// The project if the caller owns it; 403 for members, 404 otherwise.
pub fn owned(conn: &Connection, project_id: i64, user_id: i64) -> ApiResult<Project> {
    match ProjectRepo::get_accessible(conn, project_id, user_id)? {
        Some((project, Access::Owner)) => Ok(project),
        Some((_, Access::Member)) => Err(ApiError::forbidden(NOT_OWNER)),
        None => Err(ApiError::not_found("Project not found")),
    }
}

/// Check an optional project reference on a payload.
pub fn check_optional(conn: &Connection, project_id: Option<i64>, user_id: i64) -> ApiResult<()> {
    if let Some(project_id) = project_id {
        let _ = readable(conn, project_id, user_id)?;
    }
    Ok(())
}
