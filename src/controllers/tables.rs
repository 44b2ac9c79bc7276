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

use crate::controllers::staff::unique_to_bad_request;
use crate::error::AppError;
use crate::models::DiningTable;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/table", get(list_tables).post(create_table))
        .route(
            "/table/{id}",
            get(get_table).put(update_table).delete(delete_table),
        )
}

#[derive(Debug, Deserialize)]
struct TablePayload {
    table_number: i32,
    status: String,
    staff_id: Option<i64>,
    #[serde(default = "default_conn")]
    conn: String,
}

fn default_conn() -> String {
    "disconnected".to_string()
}

fn validate(req: &TablePayload) -> Result<(), AppError> {
    if !matches!(req.status.as_str(), "Available" | "Occupied") {
        return Err(AppError::BadRequest(
            "status должен быть Available | Occupied".to_string(),
        ));
    }
    if !matches!(req.conn.as_str(), "connected" | "disconnected") {
        return Err(AppError::BadRequest(
            "conn должен быть connected | disconnected".to_string(),
        ));
    }
    Ok(())
}

const TABLE_COLUMNS: &str = "id, table_number, status, staff_id, conn";

// POST /api/table
async fn create_table(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TablePayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let table: DiningTable = sqlx::query_as(&format!(
        "INSERT INTO dining_tables (table_number, status, staff_id, conn)
         VALUES ($1, $2, $3, $4)
         RETURNING {TABLE_COLUMNS}"
    ))
    .bind(req.table_number)
    .bind(&req.status)
    .bind(req.staff_id)
    .bind(&req.conn)
    .fetch_one(&state.db.pool)
    .await
    .map_err(|e| unique_to_bad_request(e, "Стол с таким номером уже существует"))?;

    state.realtime.emit("postTable", &table);
    Ok((StatusCode::CREATED, Json(table)))
}

// GET /api/table
async fn list_tables(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let tables: Vec<DiningTable> = sqlx::query_as(&format!(
        "SELECT {TABLE_COLUMNS} FROM dining_tables ORDER BY table_number"
    ))
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(tables))
}

// GET /api/table/{id}
async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let table: Option<DiningTable> = sqlx::query_as(&format!(
        "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?;

    let table = table.ok_or_else(|| AppError::NotFound("Стол не найден".to_string()))?;
    Ok(Json(table))
}

// PUT /api/table/{id}
async fn update_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<TablePayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let table: Option<DiningTable> = sqlx::query_as(&format!(
        "UPDATE dining_tables
         SET table_number = $1, status = $2, staff_id = $3, conn = $4
         WHERE id = $5
         RETURNING {TABLE_COLUMNS}"
    ))
    .bind(req.table_number)
    .bind(&req.status)
    .bind(req.staff_id)
    .bind(&req.conn)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await
    .map_err(|e| unique_to_bad_request(e, "Стол с таким номером уже существует"))?;

    let table = table.ok_or_else(|| AppError::NotFound("Стол не найден".to_string()))?;
    state.realtime.emit("putTable", &table);
    Ok(Json(table))
}

// DELETE /api/table/{id}
async fn delete_table(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM dining_tables WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Стол не найден".to_string()));
    }

    state.realtime.emit("deleteTable", &json!({ "id": id }));
    Ok(Json(json!({ "message": "Стол удалён" })))
}
