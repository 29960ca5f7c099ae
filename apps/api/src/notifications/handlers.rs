use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::Notification;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// GET /api/notifications
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Vec<Notification>> {
    Json(state.notifications.list(query.user_id.as_deref()).await)
}

/// GET /api/notifications/unread-count
pub async fn handle_unread_count(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Value> {
    let count = state
        .notifications
        .unread_count(query.user_id.as_deref())
        .await;
    Json(json!({ "count": count }))
}

/// PUT /api/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    if !state
        .notifications
        .mark_read(&id, query.user_id.as_deref())
        .await
    {
        return Err(AppError::NotFound(format!("Notification {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}

/// PUT /api/notifications/read-all
pub async fn handle_mark_all_read(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Value> {
    state
        .notifications
        .mark_all_read(query.user_id.as_deref())
        .await;
    Json(json!({ "success": true }))
}

/// DELETE /api/notifications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    if !state
        .notifications
        .delete(&id, query.user_id.as_deref())
        .await
    {
        return Err(AppError::NotFound(format!("Notification {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}
