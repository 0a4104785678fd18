// rest/routes/tasks.rs — Task CRUD, subtask, stats, and notification routes.
//
// The client key for every store call is the peer IP from ConnectInfo.
// Mutating handlers check the x-api-key header first, then validate the
// payload, then touch the store.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::rest::auth::require_api_key;
use crate::tasks::{
    notify::TaskStats, validate_priority, Task, TaskDraft, TaskFilter, TaskPatch,
    DEFAULT_PAGE_LIMIT,
};
use crate::AppContext;

fn client_key(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

/// Fire-and-forget stand-in for real delivery: when a new task carries a due
/// date, log that a notification would be scheduled. Never affects the
/// response.
fn schedule_due_log(client: &str, task: &Task) {
    if task.due_date.is_none() {
        return;
    }
    let client = client.to_string();
    let id = task.id;
    tokio::spawn(async move {
        info!(client = %client, id = %id, "notification scheduled for task due date");
    });
}

// ─── Collection routes ───────────────────────────────────────────────────────

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    require_api_key(&headers, &ctx.config)?;
    draft.validate()?;

    let client = client_key(&addr);
    let task = ctx.store.create(&client, draft).await;
    schedule_due_log(&client, &task);
    Ok((StatusCode::CREATED, Json(task)))
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Exact completion-state match.
    pub completed: Option<bool>,
    /// Task must carry this exact tag.
    pub tag: Option<String>,
    /// Exact priority match (1-5).
    pub priority: Option<u8>,
    /// Only root tasks (no parent_id).
    #[serde(default)]
    pub parent: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    validate_priority(params.priority)?;
    if params.limit == 0 {
        return Err(ApiError::validation("limit must be at least 1"));
    }

    let filter = TaskFilter {
        completed: params.completed,
        tag: params.tag,
        priority: params.priority,
        parent_only: params.parent,
        skip: params.skip,
        limit: params.limit,
    };
    Ok(Json(ctx.store.list(&client_key(&addr), &filter).await))
}

// ─── Single-task routes ──────────────────────────────────────────────────────

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = ctx.store.get(&client_key(&addr), task_id).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(task_id): Path<Uuid>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Result<Json<Task>, ApiError> {
    require_api_key(&headers, &ctx.config)?;
    draft.validate()?;

    let task = ctx.store.replace(&client_key(&addr), task_id, draft).await?;
    Ok(Json(task))
}

pub async fn patch_task(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(task_id): Path<Uuid>,
    headers: HeaderMap,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    require_api_key(&headers, &ctx.config)?;
    patch.validate()?;

    let task = ctx.store.patch(&client_key(&addr), task_id, patch).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(task_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_api_key(&headers, &ctx.config)?;

    let removed_subtasks = ctx.store.delete(&client_key(&addr), task_id).await?;
    Ok(Json(json!({
        "message": "task deleted",
        "removed_subtasks": removed_subtasks,
    })))
}

// ─── Subtask routes ──────────────────────────────────────────────────────────

pub async fn list_subtasks(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let subtasks = ctx.store.subtasks(&client_key(&addr), task_id).await?;
    Ok(Json(subtasks))
}

pub async fn create_subtask(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(task_id): Path<Uuid>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    require_api_key(&headers, &ctx.config)?;
    draft.validate()?;

    let client = client_key(&addr);
    let task = ctx.store.create_subtask(&client, task_id, draft).await?;
    schedule_due_log(&client, &task);
    Ok((StatusCode::CREATED, Json(task)))
}

// ─── Derived views ───────────────────────────────────────────────────────────

pub async fn task_stats(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<TaskStats> {
    Json(ctx.store.stats(&client_key(&addr)).await)
}

pub async fn task_notifications(
    State(ctx): State<Arc<AppContext>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<Vec<String>> {
    Json(ctx.store.notifications(&client_key(&addr)).await)
}
