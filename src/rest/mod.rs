// rest/mod.rs — HTTP API server.
//
// Axum server exposing the per-client task API. Tasks are segregated by the
// caller's peer IP; mutating routes require the x-api-key shared secret.
//
// Endpoints:
//   POST   /tasks
//   GET    /tasks
//   GET    /tasks/stats
//   GET    /tasks/notifications
//   GET    /tasks/{task_id}
//   PUT    /tasks/{task_id}
//   PATCH  /tasks/{task_id}
//   DELETE /tasks/{task_id}
//   GET    /tasks/{task_id}/subtasks
//   POST   /tasks/{task_id}/subtasks
//   GET    /health

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("task API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo carries the peer address every handler uses as client key.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/health", get(routes::health::health))
        // Tasks
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        // Static segments before the {task_id} capture
        .route("/tasks/stats", get(routes::tasks::task_stats))
        .route(
            "/tasks/notifications",
            get(routes::tasks::task_notifications),
        )
        .route(
            "/tasks/{task_id}",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .patch(routes::tasks::patch_task)
                .delete(routes::tasks::delete_task),
        )
        // Subtasks
        .route(
            "/tasks/{task_id}/subtasks",
            get(routes::tasks::list_subtasks).post(routes::tasks::create_subtask),
        )
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
