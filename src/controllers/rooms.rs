//! rooms.rs
//!
//! Модуль управления комнатами и их местами.
//!
//! Включает в себя следующую функциональность:
//! - CRUD по комнатам; список мест заменяется целиком при обновлении,
//!   как это делает форма редактирования.
//! - Автогенерацию мест по размерам зала со списком пропущенных букв.
//! - Выдачу готовой схемы рассадки комнаты: чистая производная от
//!   текущего списка мест, кешируется до первой мутации комнаты.

use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::controllers::staff::unique_to_bad_request;
use crate::error::AppError;
use crate::models::room::RoomWithSeats;
use crate::models::{Room, Seat};
use crate::seating::{self, build_layout, generate_seats, parse_skip_list};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/room", get(list_rooms).post(create_room))
        .route(
            "/room/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/room/{id}/seating", get(room_seating))
}

#[derive(Debug, Deserialize)]
struct SeatPayload {
    seat_code: String,
    row_letter: Option<String>,
    col_number: Option<i32>,
    #[serde(default = "default_seat_status")]
    status: String,
    student_id: Option<i64>,
    exam_id: Option<i64>,
}

fn default_seat_status() -> String {
    "Available".to_string()
}

#[derive(Debug, Deserialize)]
struct RoomPayload {
    room_code: String,
    staff_id: Option<i64>,
    // Буквы, пропущенные при генерации ("D, G"). Сохраняются на комнате,
    // чтобы схема отличала пропуск от просто пустого столбца.
    #[serde(rename = "skipColumns")]
    skip_columns: Option<String>,
    // Автогенерация: если заданы размеры, список seats игнорируется
    #[serde(rename = "numRows")]
    num_rows: Option<u32>,
    #[serde(rename = "numColumns")]
    num_columns: Option<u32>,
    #[serde(default)]
    seats: Vec<SeatPayload>,
}

enum SeatSource {
    Generated(Vec<seating::NewSeat>),
    Listed(Vec<SeatPayload>),
}

/// Определяет список мест из запроса: либо сгенерировать по размерам,
/// либо взять переданный вручную.
fn resolve_seats(req: &mut RoomPayload, skipped: &[char]) -> Result<SeatSource, AppError> {
    match (req.num_rows, req.num_columns) {
        (Some(rows), Some(columns)) => {
            if rows == 0 || columns == 0 {
                return Err(AppError::BadRequest(
                    "Число рядов и столбцов должно быть больше нуля".to_string(),
                ));
            }
            Ok(SeatSource::Generated(generate_seats(rows, columns, skipped)))
        }
        (None, None) => Ok(SeatSource::Listed(std::mem::take(&mut req.seats))),
        _ => Err(AppError::BadRequest(
            "Для автогенерации нужны и numRows, и numColumns".to_string(),
        )),
    }
}

async fn insert_seats(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    room_id: i64,
    source: SeatSource,
) -> Result<(), sqlx::Error> {
    match source {
        SeatSource::Generated(seats) => {
            for seat in seats {
                sqlx::query(
                    "INSERT INTO seats (room_id, seat_code, row_letter, col_number, status)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(room_id)
                .bind(&seat.seat_code)
                .bind(seat.row_letter.to_string())
                .bind(seat.col_number as i32)
                .bind(seat.status)
                .execute(&mut **tx)
                .await?;
            }
        }
        SeatSource::Listed(seats) => {
            for seat in seats {
                sqlx::query(
                    "INSERT INTO seats (room_id, seat_code, row_letter, col_number, status, student_id, exam_id)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(room_id)
                .bind(&seat.seat_code)
                .bind(&seat.row_letter)
                .bind(seat.col_number)
                .bind(&seat.status)
                .bind(seat.student_id)
                .bind(seat.exam_id)
                .execute(&mut **tx)
                .await?;
            }
        }
    }
    Ok(())
}

async fn load_room(pool: &sqlx::PgPool, id: i64) -> Result<Option<RoomWithSeats>, sqlx::Error> {
    let room: Option<Room> = sqlx::query_as(
        "SELECT id, room_code, staff_id, skipped_columns FROM rooms WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(room) = room else {
        return Ok(None);
    };

    let seats: Vec<Seat> = sqlx::query_as(
        "SELECT id, room_id, seat_code, row_letter, col_number, status, student_id, exam_id
         FROM seats
         WHERE room_id = $1
         ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(RoomWithSeats { room, seats }))
}

// POST /api/room
async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<RoomPayload>,
) -> Result<impl IntoResponse, AppError> {
    let skipped = parse_skip_list(req.skip_columns.as_deref().unwrap_or(""));
    let source = resolve_seats(&mut req, &skipped)?;

    // Нормализованный список пропусков сохраняется вместе с комнатой
    let skipped_value: String = skipped.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",");

    let mut tx = state.db.pool.begin().await?;

    let room: Room = sqlx::query_as(
        "INSERT INTO rooms (room_code, staff_id, skipped_columns)
         VALUES ($1, $2, $3)
         RETURNING id, room_code, staff_id, skipped_columns",
    )
    .bind(&req.room_code)
    .bind(req.staff_id)
    .bind(&skipped_value)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| unique_to_bad_request(e, "Комната с таким кодом уже существует"))?;

    insert_seats(&mut tx, room.id, source).await?;
    tx.commit().await?;

    state.cache.invalidate_rooms().await;

    let room = load_room(&state.db.pool, room.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Комната не найдена".to_string()))?;
    state.realtime.emit("postRoom", &room);
    Ok((StatusCode::CREATED, Json(room)))
}

// GET /api/room
async fn list_rooms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.cache.get_rooms().await)
}

// GET /api/room/{id}
async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let room = load_room(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Комната с ID {} не найдена", id)))?;
    Ok(Json(room))
}

// PUT /api/room/{id} - полная замена комнаты вместе со списком мест
async fn update_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut req): Json<RoomPayload>,
) -> Result<impl IntoResponse, AppError> {
    let skipped = parse_skip_list(req.skip_columns.as_deref().unwrap_or(""));
    let source = resolve_seats(&mut req, &skipped)?;
    let skipped_value: String = skipped.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",");

    let mut tx = state.db.pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE rooms SET room_code = $1, staff_id = $2, skipped_columns = $3 WHERE id = $4",
    )
    .bind(&req.room_code)
    .bind(req.staff_id)
    .bind(&skipped_value)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| unique_to_bad_request(e, "Комната с таким кодом уже существует"))?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::NotFound(format!(
            "Комната с ID {} не найдена",
            id
        )));
    }

    sqlx::query("DELETE FROM seats WHERE room_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_seats(&mut tx, id, source).await?;
    tx.commit().await?;

    state.cache.invalidate_rooms().await;

    let room = load_room(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Комната не найдена".to_string()))?;
    state.realtime.emit("putRoom", &room);
    Ok(Json(room))
}

// DELETE /api/room/{id}
async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound(format!(
            "Комната с ID {} не найдена",
            id
        )));
    }

    state.cache.invalidate_rooms().await;
    state.realtime.emit("deleteRoom", &json!({ "id": id }));
    Ok(Json(json!({ "message": "Комната удалена" })))
}

// GET /api/room/{id}/seating
//
// Структурная схема рассадки для слоя отрисовки. Считается заново только
// когда комната менялась: готовый JSON лежит в кеше и сбрасывается при
// каждой мутации комнаты.
async fn room_seating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if let Ok(Some(cached)) = state.cache.get_cached_seating(id).await {
        return Ok(Response::builder()
            .header("Content-Type", "application/json")
            .header("X-Cache", "HIT")
            .body(Body::from(cached))
            .unwrap());
    }

    let RoomWithSeats { room, seats } = load_room(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Комната с ID {} не найдена", id)))?;

    // Места с неразборчивым кодом в схему не попадают; это проблема
    // качества данных, фиксируем её в логе
    let bad_codes = seating::grid::unplaceable_codes(&seats);
    if !bad_codes.is_empty() {
        warn!(
            "room {}: {} seats with unparsable codes skipped: {:?}",
            room.room_code,
            bad_codes.len(),
            bad_codes
        );
    }

    let layout = build_layout(&room, &seats, &state.seating_theme);

    let json_str = serde_json::to_string(&layout)
        .map_err(|e| {
            tracing::error!("failed to serialize seating layout: {:?}", e);
            AppError::BadRequest("Не удалось построить схему".to_string())
        })?;

    if let Err(e) = state.cache.cache_seating(id, &json_str).await {
        tracing::error!("failed to cache seating layout: {:?}", e);
    }

    Ok(Response::builder()
        .header("Content-Type", "application/json")
        .header("X-Cache", "MISS")
        .body(Body::from(json_str))
        .unwrap())
}
