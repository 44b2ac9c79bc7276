use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Exam;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/exam", get(list_exams).post(create_exam))
        .route(
            "/exam/{id}",
            get(get_exam).put(update_exam).delete(delete_exam),
        )
}

#[derive(Debug, Deserialize)]
struct ExamPayload {
    course_code: String,
    course_name: Option<String>,
    date: NaiveDateTime,
    #[serde(default = "default_seating")]
    seating: String,
    #[serde(default = "default_status")]
    status: String,
}

fn default_seating() -> String {
    "not-published".to_string()
}

fn default_status() -> String {
    "upcoming".to_string()
}

fn validate(req: &ExamPayload) -> Result<(), AppError> {
    if !matches!(req.seating.as_str(), "not-published" | "published") {
        return Err(AppError::BadRequest(
            "seating должен быть not-published | published".to_string(),
        ));
    }
    if !matches!(req.status.as_str(), "upcoming" | "ongoing" | "end") {
        return Err(AppError::BadRequest(
            "status должен быть upcoming | ongoing | end".to_string(),
        ));
    }
    Ok(())
}

// POST /api/exam
async fn create_exam(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExamPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let exam: Exam = sqlx::query_as(
        "INSERT INTO exams (course_code, course_name, date, seating, status)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, course_code, course_name, date, seating, status",
    )
    .bind(&req.course_code)
    .bind(&req.course_name)
    .bind(req.date)
    .bind(&req.seating)
    .bind(&req.status)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(exam)))
}

// GET /api/exam
async fn list_exams(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let exams: Vec<Exam> = sqlx::query_as(
        "SELECT id, course_code, course_name, date, seating, status FROM exams ORDER BY date",
    )
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(exams))
}

// GET /api/exam/{id}
async fn get_exam(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam: Option<Exam> = sqlx::query_as(
        "SELECT id, course_code, course_name, date, seating, status FROM exams WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?;

    let exam = exam.ok_or_else(|| AppError::NotFound("Экзамен не найден".to_string()))?;
    Ok(Json(exam))
}

// PUT /api/exam/{id}
async fn update_exam(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ExamPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let exam: Option<Exam> = sqlx::query_as(
        "UPDATE exams
         SET course_code = $1, course_name = $2, date = $3, seating = $4, status = $5
         WHERE id = $6
         RETURNING id, course_code, course_name, date, seating, status",
    )
    .bind(&req.course_code)
    .bind(&req.course_name)
    .bind(req.date)
    .bind(&req.seating)
    .bind(&req.status)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?;

    let exam = exam.ok_or_else(|| AppError::NotFound("Экзамен не найден".to_string()))?;
    Ok(Json(exam))
}

// DELETE /api/exam/{id}
async fn delete_exam(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM exams WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Экзамен не найден".to_string()));
    }
    Ok(Json(json!({ "message": "Экзамен удалён" })))
}
