//! `/api/tasks`: personal tasks, optionally attached to a project.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use ipms_core::ProjectActionType;
use ipms_core::models::{Task, TaskCreate, TaskFilter, TaskStats, TaskUpdate};
use ipms_store::Connection;
use ipms_store::repositories::{ProjectActivityRepo, TaskRepo};
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::routes::{access, message};
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/{id}", get(show).put(update).patch(update).delete(remove))
}

fn not_found() -> ApiError {
    ApiError::not_found("Task not found")
}

fn record(
    conn: &Connection,
    task: &Task,
    user_id: i64,
    action: ProjectActionType,
    verb: &str,
) -> ApiResult<()> {
    if let Some(project_id) = task.project_id {
        let _ = ProjectActivityRepo::record(
            conn,
            project_id,
            user_id,
            action,
            &format!("{verb} task \"{}\"", task.title),
            &json!({ "task_id": task.id }),
            Utc::now(),
        )?;
    }
    Ok(())
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<TaskCreate>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    payload.validate()?;
    let user_id = user.id();
    let task = state
        .run_tx(move |conn| {
            access::check_optional(conn, payload.project_id, user_id)?;
            let task = TaskRepo::create(conn, user_id, &payload, Utc::now())?;
            record(conn, &task, user_id, ProjectActionType::AddTask, "Added")?;
            Ok(task)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    let user_id = user.id();
    let tasks = state
        .run(move |conn| Ok(TaskRepo::list(conn, user_id, &filter)?))
        .await?;
    Ok(Json(tasks))
}

async fn stats(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<TaskStats>> {
    let user_id = user.id();
    let stats = state
        .run(move |conn| Ok(TaskRepo::stats(conn, user_id, Utc::now())?))
        .await?;
    Ok(Json(stats))
}

async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Task>> {
    let user_id = user.id();
    let task = state
        .run(move |conn| TaskRepo::get(conn, id, user_id)?.ok_or_else(not_found))
        .await?;
    Ok(Json(task))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<TaskUpdate>,
) -> ApiResult<Json<Task>> {
    update.validate()?;
    let user_id = user.id();
    let task = state
        .run_tx(move |conn| {
            let mut task = TaskRepo::get(conn, id, user_id)?.ok_or_else(not_found)?;
            if let Some(project_id) = update.project_id {
                access::check_optional(conn, project_id, user_id)?;
            }
            let now = Utc::now();
            let completed = task.apply(update, now);
            task.updated_at = now;
            TaskRepo::save(conn, &task)?;
            if completed {
                record(conn, &task, user_id, ProjectActionType::CompleteTask, "Completed")?;
            }
            Ok(task)
        })
        .await?;
    Ok(Json(task))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    let deleted = state
        .run(move |conn| Ok(TaskRepo::delete(conn, id, user_id)?))
        .await?;
    if !deleted {
        return Err(not_found());
    }
    Ok(message("Task deleted successfully"))
}
