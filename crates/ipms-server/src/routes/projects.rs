//! `/api/projects`: projects, their members, linked ideas, and timeline.
//!
//! Owners have full access; members may read the project and everything
//! attached to it. Anyone else sees a 404.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::models::{
    ConceptNote, Idea, Log, MemberAdd, Mindmap, Project, ProjectActivity, ProjectCreate,
    ProjectFilter, ProjectMember, ProjectUpdate, Task,
};
use ipms_core::{MemberRole, ProjectActionType, validation};
use ipms_store::repositories::{
    ConceptNoteRepo, IdeaRepo, LogRepo, MemberRepo, MindmapRepo, ProjectActivityRepo, ProjectRepo,
    TaskRepo, UserRepo,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::routes::{access, message};
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/tasks", get(tasks))
        .route("/{id}/ideas", get(ideas))
        .route("/{id}/ideas/{idea_id}", post(link_idea).delete(unlink_idea))
        .route("/{id}/concepts", get(concepts))
        .route("/{id}/logs", get(logs))
        .route("/{id}/mindmaps", get(mindmaps))
        .route("/{id}/activities", get(activities))
        .route("/{id}/members", get(members).post(add_member))
        .route("/{id}/members/{user_id}", delete(remove_member))
}

#[derive(Deserialize)]
struct TimelineQuery {
    #[serde(default = "default_timeline_limit")]
    limit: u32,
}

fn default_timeline_limit() -> u32 {
    50
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ProjectCreate>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    payload.validate()?;
    let user_id = user.id();
    let project = state
        .run_tx(move |conn| {
            let now = Utc::now();
            let project = ProjectRepo::create(conn, user_id, &payload, now)?;
            let _ = ProjectActivityRepo::record(
                conn,
                project.id,
                user_id,
                ProjectActionType::Create,
                &format!("Created project \"{}\"", project.title),
                &json!({}),
                now,
            )?;
            Ok(project)
        })
        .await?;
    info!(project_id = project.id, user_id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(filter): ApiQuery<ProjectFilter>,
) -> ApiResult<Json<Vec<Project>>> {
    filter.validate()?;
    let user_id = user.id();
    let projects = state
        .run(move |conn| Ok(ProjectRepo::list_accessible(conn, user_id, &filter)?))
        .await?;
    Ok(Json(projects))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Project>> {
    let user_id = user.id();
    let project = state
        .run(move |conn| access::readable(conn, id, user_id))
        .await?;
    Ok(Json(project))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    update.validate()?;
    let user_id = user.id();
    let project = state
        .run_tx(move |conn| {
            let mut project = access::owned(conn, id, user_id)?;
            let fields = update.changed_fields();
            let now = Utc::now();
            project.apply(update);
            project.updated_at = now;
            ProjectRepo::save(conn, &project)?;
            let _ = ProjectActivityRepo::record(
                conn,
                project.id,
                user_id,
                ProjectActionType::Update,
                "Updated project details",
                &json!({ "fields": fields }),
                now,
            )?;
            Ok(project)
        })
        .await?;
    Ok(Json(project))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    state
        .run_tx(move |conn| {
            let project = access::owned(conn, id, user_id)?;
            let _ = ProjectRepo::delete(conn, project.id)?;
            Ok(())
        })
        .await?;
    info!(project_id = id, user_id, "project deleted");
    Ok(message("Project deleted successfully"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Attached resources
// ─────────────────────────────────────────────────────────────────────────────

async fn tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    let user_id = user.id();
    let tasks = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(TaskRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(tasks))
}

async fn ideas(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Idea>>> {
    let user_id = user.id();
    let ideas = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(IdeaRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(ideas))
}

async fn concepts(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ConceptNote>>> {
    let user_id = user.id();
    let notes = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(ConceptNoteRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(notes))
}

async fn logs(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Log>>> {
    let user_id = user.id();
    let logs = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(LogRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(logs))
}

async fn mindmaps(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Mindmap>>> {
    let user_id = user.id();
    let maps = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(MindmapRepo::list_by_project(conn, project.id)?)
        })
        .await?;
    Ok(Json(maps))
}

async fn activities(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TimelineQuery>,
) -> ApiResult<Json<Vec<ProjectActivity>>> {
    validation::limit(query.limit)?;
    let user_id = user.id();
    let entries = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(ProjectActivityRepo::list(conn, project.id, query.limit)?)
        })
        .await?;
    Ok(Json(entries))
}

// ─────────────────────────────────────────────────────────────────────────────
// Idea links
// ─────────────────────────────────────────────────────────────────────────────

async fn link_idea(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, idea_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<Idea>> {
    let user_id = user.id();
    let idea = state
        .run_tx(move |conn| {
            let project = access::owned(conn, id, user_id)?;
            let idea = IdeaRepo::get(conn, idea_id, user_id)?
                .ok_or_else(|| ApiError::not_found("Idea not found"))?;
            let now = Utc::now();
            IdeaRepo::link(conn, project.id, idea.id, now)?;
            let _ = ProjectActivityRepo::record(
                conn,
                project.id,
                user_id,
                ProjectActionType::Link,
                &format!("Linked idea \"{}\"", idea.title),
                &json!({ "idea_id": idea.id }),
                now,
            )?;
            Ok(idea)
        })
        .await?;
    Ok(Json(idea))
}

async fn unlink_idea(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, idea_id)): ApiPath<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let user_id = user.id();
    state
        .run_tx(move |conn| {
            let project = access::owned(conn, id, user_id)?;
            if !IdeaRepo::unlink(conn, project.id, idea_id)? {
                return Err(ApiError::not_found("Idea is not linked to this project"));
            }
            let _ = ProjectActivityRepo::record(
                conn,
                project.id,
                user_id,
                ProjectActionType::Unlink,
                "Unlinked idea",
                &json!({ "idea_id": idea_id }),
                Utc::now(),
            )?;
            Ok(())
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Members
// ─────────────────────────────────────────────────────────────────────────────

async fn members(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ProjectMember>>> {
    let user_id = user.id();
    let members = state
        .run(move |conn| {
            let project = access::readable(conn, id, user_id)?;
            Ok(MemberRepo::list(conn, project.id)?)
        })
        .await?;
    Ok(Json(members))
}

async fn add_member(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<MemberAdd>,
) -> ApiResult<(StatusCode, Json<ProjectMember>)> {
    payload.validate()?;
    let user_id = user.id();
    let member = state
        .run_tx(move |conn| {
            let project = access::owned(conn, id, user_id)?;
            let invitee = UserRepo::get_by_id(conn, payload.user_id)?
                .ok_or_else(|| ApiError::not_found("User not found"))?;
            let now = Utc::now();
            let member = MemberRepo::add(conn, project.id, invitee.id, payload.role, now)?;
            let _ = ProjectActivityRepo::record(
                conn,
                project.id,
                user_id,
                ProjectActionType::AddMember,
                &format!("Added {} as {}", invitee.username, payload.role.as_str()),
                &json!({ "user_id": invitee.id, "role": payload.role }),
                now,
            )?;
            Ok(member)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn remove_member(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, member_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    state
        .run_tx(move |conn| {
            let project = access::owned(conn, id, user_id)?;
            let member = MemberRepo::get(conn, project.id, member_id)?
                .ok_or_else(|| ApiError::not_found("Member not found"))?;
            if member.role == MemberRole::Owner || member.user_id == project.owner_id {
                return Err(ApiError::bad_request("Cannot remove the project owner"));
            }
            let _ = MemberRepo::remove(conn, project.id, member.user_id)?;
            let _ = ProjectActivityRepo::record(
                conn,
                project.id,
                user_id,
                ProjectActionType::RemoveMember,
                &format!("Removed {}", member.username),
                &json!({ "user_id": member.user_id }),
                Utc::now(),
            )?;
            Ok(())
        })
        .await?;
    Ok(message("Member removed successfully"))
}
