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
use crate::models::Staff;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff))
        .route(
            "/staff/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}

#[derive(Debug, Deserialize)]
struct StaffPayload {
    staff_code: String,
    name: String,
    department: String,
    password: String,
}

// POST /api/staff
async fn create_staff(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    let staff: Staff = sqlx::query_as(
        "INSERT INTO staff (staff_code, name, department, password)
         VALUES ($1, $2, $3, $4)
         RETURNING id, staff_code, name, department, password",
    )
    .bind(&req.staff_code)
    .bind(&req.name)
    .bind(&req.department)
    .bind(&req.password)
    .fetch_one(&state.db.pool)
    .await
    .map_err(|e| unique_to_bad_request(e, "Сотрудник с таким кодом уже существует"))?;

    Ok((StatusCode::CREATED, Json(staff)))
}

// GET /api/staff
async fn list_staff(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let staff: Vec<Staff> =
        sqlx::query_as("SELECT id, staff_code, name, department, password FROM staff ORDER BY name")
            .fetch_all(&state.db.pool)
            .await?;
    Ok(Json(staff))
}

// GET /api/staff/{id}
async fn get_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let staff: Option<Staff> =
        sqlx::query_as("SELECT id, staff_code, name, department, password FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db.pool)
            .await?;

    let staff = staff.ok_or_else(|| AppError::NotFound("Сотрудник не найден".to_string()))?;
    Ok(Json(staff))
}

// PUT /api/staff/{id}
async fn update_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<StaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    let staff: Option<Staff> = sqlx::query_as(
        "UPDATE staff
         SET staff_code = $1, name = $2, department = $3, password = $4
         WHERE id = $5
         RETURNING id, staff_code, name, department, password",
    )
    .bind(&req.staff_code)
    .bind(&req.name)
    .bind(&req.department)
    .bind(&req.password)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await
    .map_err(|e| unique_to_bad_request(e, "Сотрудник с таким кодом уже существует"))?;

    let staff = staff.ok_or_else(|| AppError::NotFound("Сотрудник не найден".to_string()))?;
    Ok(Json(staff))
}

// DELETE /api/staff/{id}
async fn delete_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM staff WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Сотрудник не найден".to_string()));
    }
    Ok(Json(json!({ "message": "Сотрудник удалён" })))
}

pub(crate) fn unique_to_bad_request(e: sqlx::Error, message: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest(message.to_string())
        }
        _ => AppError::Db(e),
    }
}
