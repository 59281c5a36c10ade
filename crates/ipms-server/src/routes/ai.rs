//! `/api/ai`: thin facade over the configured [`Assistant`](ipms_ai::Assistant).

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use ipms_ai::{ModelStatus, TaskAnalysis};
use ipms_core::validation;
use ipms_store::repositories::{ActivityRepo, JournalEntryRepo, TaskRepo};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::routes::message;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/initialize", post(initialize))
        .route("/generate", post(generate))
        .route("/analyze/journal", post(analyze_journal))
        .route("/suggest/goals", post(suggest_goals))
        .route("/categorize/activity", post(categorize_activity))
        .route("/process/data", post(process_data))
        .route("/analyze-task", post(analyze_task))
        .route("/optimize-task/{task_id}", get(optimize_task))
        .route("/status", get(status))
}

#[derive(Deserialize)]
struct InitializeRequest {
    #[serde(default)]
    model_path: Option<String>,
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    context_types: Vec<String>,
    #[serde(default)]
    max_length: Option<u32>,
}

#[derive(Deserialize)]
struct JournalRequest {
    entry: String,
}

#[derive(Deserialize)]
struct GoalsRequest {
    user_data: Value,
}

#[derive(Deserialize)]
struct CategorizeRequest {
    activity_data: Value,
}

#[derive(Deserialize)]
struct AnalyzeTaskRequest {
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ProcessRequest {
    data_types: Vec<String>,
}

async fn initialize(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<InitializeRequest>,
) -> Json<Value> {
    state.assistant.initialize(payload.model_path.as_deref());
    info!(model = %state.assistant.status().model, "assistant initialized");
    message("AI assistant initialized successfully")
}

async fn generate(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<GenerateRequest>,
) -> Json<Value> {
    let response = state
        .assistant
        .generate(&payload.prompt, &payload.context_types, payload.max_length)
        .await;
    Json(json!({ "response": response }))
}

async fn analyze_journal(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<JournalRequest>,
) -> Json<Value> {
    let sentiment = state.assistant.analyze_sentiment(&payload.entry).await;
    Json(json!({ "sentiment": sentiment }))
}

async fn suggest_goals(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<GoalsRequest>,
) -> Json<Value> {
    let suggestions = state.assistant.suggest_goals(&payload.user_data).await;
    Json(json!({ "suggestions": suggestions }))
}

async fn categorize_activity(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<CategorizeRequest>,
) -> Json<Value> {
    let category = state.assistant.categorize_activity(&payload.activity_data).await;
    Json(json!({ "category": category }))
}

async fn process_data(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ProcessRequest>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    let wants = |kind: &str| payload.data_types.iter().any(|t| t == kind);
    let (journal, activity) = (wants("journal_entry"), wants("activity"));
    let documents = state
        .run(move |conn| {
            let mut total = 0;
            if journal {
                total += JournalEntryRepo::count_for_user(conn, user_id)?;
            }
            if activity {
                total += ActivityRepo::count_for_user(conn, user_id)?;
            }
            Ok(total)
        })
        .await?;
    Ok(Json(json!({
        "message": format!("Processed {documents} documents"),
        "types": payload.data_types,
    })))
}

async fn analyze_task(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<AnalyzeTaskRequest>,
) -> ApiResult<Json<TaskAnalysis>> {
    validation::title(&payload.title)?;
    let analysis = state
        .assistant
        .analyze_task(payload.title.trim(), &payload.description)
        .await;
    Ok(Json(analysis))
}

async fn optimize_task(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let user_id = user.id();
    let task = state
        .run(move |conn| {
            TaskRepo::get(conn, task_id, user_id)?
                .ok_or_else(|| ApiError::not_found("Task not found"))
        })
        .await?;
    let suggestions = state.assistant.optimize_task(&task).await;
    Ok(Json(json!({ "task_id": task.id, "suggestions": suggestions })))
}

async fn status(State(state): State<AppState>, _user: CurrentUser) -> Json<ModelStatus> {
    Json(state.assistant.status())
}
