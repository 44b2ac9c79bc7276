//! students.rs
//!
//! Модуль управления студентами: CRUD, поиск по регистрационному номеру
//! и запись на экзамены. Регистрации хранятся отдельной таблицей и
//! отдаются вместе со студентом.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::controllers::staff::unique_to_bad_request;
use crate::error::AppError;
use crate::models::student::StudentExam;
use crate::models::Student;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/student", get(list_students).post(create_student))
        .route("/student/search", get(search_student))
        .route(
            "/student/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/student/{id}/add-exams", put(add_exams))
}

#[derive(Debug, Serialize)]
struct StudentResponse {
    #[serde(flatten)]
    student: Student,
    exams: Vec<StudentExam>,
}

#[derive(Debug, Deserialize)]
struct StudentPayload {
    reg_no: String,
    name: Option<String>,
    roll_no: Option<i32>,
    semester: Option<String>,
    department: Option<String>,
    dob: NaiveDate,
    password: String,
    staff_id: i64,
}

const STUDENT_COLUMNS: &str =
    "id, reg_no, name, roll_no, semester, department, dob, password, staff_id";

async fn load_student(
    pool: &sqlx::PgPool,
    id: i64,
) -> Result<Option<StudentResponse>, sqlx::Error> {
    let student: Option<Student> = sqlx::query_as(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(student) = student else {
        return Ok(None);
    };

    let exams: Vec<StudentExam> = sqlx::query_as(
        "SELECT id, student_id, exam_id, status FROM student_exams WHERE student_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(StudentResponse { student, exams }))
}

// POST /api/student
async fn create_student(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StudentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let student: Student = sqlx::query_as(&format!(
        "INSERT INTO students (reg_no, name, roll_no, semester, department, dob, password, staff_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {STUDENT_COLUMNS}"
    ))
    .bind(&req.reg_no)
    .bind(&req.name)
    .bind(req.roll_no)
    .bind(&req.semester)
    .bind(&req.department)
    .bind(req.dob)
    .bind(&req.password)
    .bind(req.staff_id)
    .fetch_one(&state.db.pool)
    .await
    .map_err(|e| unique_to_bad_request(e, "Студент с таким регистрационным номером уже существует"))?;

    let response = StudentResponse {
        student,
        exams: vec![],
    };
    state.realtime.emit("newStudent", &response);
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/student
async fn list_students(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let students: Vec<Student> =
        sqlx::query_as(&format!("SELECT {STUDENT_COLUMNS} FROM students ORDER BY reg_no"))
            .fetch_all(&state.db.pool)
            .await?;

    let registrations: Vec<StudentExam> =
        sqlx::query_as("SELECT id, student_id, exam_id, status FROM student_exams ORDER BY id")
            .fetch_all(&state.db.pool)
            .await?;

    let mut by_student: HashMap<i64, Vec<StudentExam>> = HashMap::new();
    for reg in registrations {
        by_student.entry(reg.student_id).or_default().push(reg);
    }

    let response: Vec<StudentResponse> = students
        .into_iter()
        .map(|student| {
            let exams = by_student.remove(&student.id).unwrap_or_default();
            StudentResponse { student, exams }
        })
        .collect();

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    reg_no: Option<String>,
}

// GET /api/student/search?reg_no=...
async fn search_student(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reg_no = params
        .reg_no
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("Требуется параметр reg_no".to_string()))?;

    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM students WHERE reg_no = $1")
        .bind(&reg_no)
        .fetch_optional(&state.db.pool)
        .await?;

    let id = id.ok_or_else(|| {
        AppError::NotFound(format!("Студент с номером {} не найден", reg_no))
    })?;

    let student = load_student(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Студент не найден".to_string()))?;
    Ok(Json(student))
}

// GET /api/student/{id}
async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = load_student(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Студент не найден".to_string()))?;
    Ok(Json(student))
}

// PUT /api/student/{id}
async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<StudentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let updated = sqlx::query(
        "UPDATE students
         SET reg_no = $1, name = $2, roll_no = $3, semester = $4,
             department = $5, dob = $6, password = $7, staff_id = $8
         WHERE id = $9",
    )
    .bind(&req.reg_no)
    .bind(&req.name)
    .bind(req.roll_no)
    .bind(&req.semester)
    .bind(&req.department)
    .bind(req.dob)
    .bind(&req.password)
    .bind(req.staff_id)
    .bind(id)
    .execute(&state.db.pool)
    .await
    .map_err(|e| unique_to_bad_request(e, "Студент с таким регистрационным номером уже существует"))?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::NotFound("Студент не найден".to_string()));
    }

    let student = load_student(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Студент не найден".to_string()))?;
    state.realtime.emit("updateStudent", &student);
    Ok(Json(student))
}

// DELETE /api/student/{id}
async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM students WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Студент не найден".to_string()));
    }

    state.realtime.emit("deleteStudent", &json!({ "id": id }));
    Ok(Json(json!({ "message": "Студент удалён" })))
}

#[derive(Debug, Deserialize)]
struct AddExamsRequest {
    #[serde(rename = "newExams")]
    new_exams: Vec<NewExamEntry>,
}

#[derive(Debug, Deserialize)]
struct NewExamEntry {
    exam_id: i64,
    #[serde(default)]
    status: Option<String>,
}

// PUT /api/student/{id}/add-exams - запись студента на экзамены
async fn add_exams(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AddExamsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.new_exams.is_empty() {
        return Err(AppError::BadRequest(
            "Нужен хотя бы один экзамен для записи".to_string(),
        ));
    }
    for entry in &req.new_exams {
        if entry.exam_id <= 0 {
            return Err(AppError::BadRequest(
                "Каждая запись должна содержать exam_id".to_string(),
            ));
        }
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
        .bind(id)
        .fetch_one(&state.db.pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Студент не найден".to_string()));
    }

    // Повторная запись на тот же экзамен молча пропускается
    for entry in &req.new_exams {
        sqlx::query(
            "INSERT INTO student_exams (student_id, exam_id, status)
             VALUES ($1, $2, $3)
             ON CONFLICT (student_id, exam_id) DO NOTHING",
        )
        .bind(id)
        .bind(entry.exam_id)
        .bind(entry.status.as_deref().unwrap_or("upcoming"))
        .execute(&state.db.pool)
        .await?;
    }

    let student = load_student(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Студент не найден".to_string()))?;
    state.realtime.emit("updateStudentExams", &student);
    Ok(Json(student))
}
