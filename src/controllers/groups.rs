use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::MenuGroup;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/group", get(list_groups).post(create_group))
        .route("/group/{id}", axum::routing::delete(delete_group))
}

#[derive(Debug, Deserialize)]
struct GroupPayload {
    #[serde(rename = "group")]
    name: String,
}

// POST /api/group
async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let group: MenuGroup =
        sqlx::query_as("INSERT INTO menu_groups (name) VALUES ($1) RETURNING id, name")
            .bind(&req.name)
            .fetch_one(&state.db.pool)
            .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

// GET /api/group
async fn list_groups(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let groups: Vec<MenuGroup> = sqlx::query_as("SELECT id, name FROM menu_groups ORDER BY name")
        .fetch_all(&state.db.pool)
        .await?;
    Ok(Json(groups))
}

// DELETE /api/group/{id}
async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM menu_groups WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Группа не найдена".to_string()));
    }
    Ok(Json(json!({ "message": "Группа удалена" })))
}
