//! orders.rs
//!
//! Модуль управления заказами ресторана.
//!
//! Включает в себя следующую функциональность:
//! - Создание и редактирование заказов; сумма заказа всегда
//!   пересчитывается сервером по текущим ценам меню, оплаченная сумма -
//!   это всегда cash + upi.
//! - Список заказов за день и активный заказ стола.
//! - Дозаказ: добавление позиций в существующий заказ со слиянием
//!   количества.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Order;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/order", get(list_orders).post(create_order))
        .route(
            "/order/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/order/{id}/add-items", put(add_items))
        .route("/order/table/{table_number}", get(get_active_order_for_table))
}

/* ---------- helpers ---------- */

const ORDER_COLUMNS: &str =
    "id, table_number, staff_id, total_amount, cash, upi, paid_amount, status, order_type, datetime";

#[derive(Debug, Serialize, FromRow)]
pub struct OrderItemView {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemView>,
}

async fn load_order(pool: &sqlx::PgPool, id: i64) -> Result<Option<OrderResponse>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items: Vec<OrderItemView> = sqlx::query_as(
        "SELECT oi.id, oi.order_id, oi.item_id, m.name, m.price, oi.quantity, oi.status
         FROM order_items oi
         JOIN menu_items m ON m.id = oi.item_id
         WHERE oi.order_id = $1
         ORDER BY oi.id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(OrderResponse { order, items }))
}

/// Пересчитывает сумму заказа по текущим ценам меню.
async fn recompute_total(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: i64,
) -> Result<(), sqlx::Error> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(m.price * oi.quantity), 0)
         FROM order_items oi
         JOIN menu_items m ON m.id = oi.item_id
         WHERE oi.order_id = $1",
    )
    .bind(order_id)
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query("UPDATE orders SET total_amount = $1, paid_amount = cash + upi WHERE id = $2")
        .bind(total)
        .bind(order_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn missing_item_to_bad_request(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::BadRequest("Позиция меню не найдена".to_string())
        }
        _ => AppError::Db(e),
    }
}

/// Границы суток для выборки заказов: либо переданная дата, либо сегодня.
pub(crate) fn day_bounds(
    date: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let day = match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest("Неверный формат даты. Ожидается YYYY-MM-DD.".to_string())
        })?,
        None => Utc::now().date_naive(),
    };
    Ok(date_bounds(day))
}

pub(crate) fn date_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = day.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
    (start, end)
}

/* ---------- handlers ---------- */

#[derive(Debug, Deserialize)]
struct OrderItemPayload {
    item_id: i64,
    quantity: i32,
    #[serde(default = "default_item_status")]
    status: String,
}

fn default_item_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Deserialize)]
struct OrderPayload {
    #[serde(default)]
    table_number: i32,
    staff_id: i64,
    #[serde(default)]
    items: Vec<OrderItemPayload>,
    #[serde(default)]
    cash: f64,
    #[serde(default)]
    upi: f64,
    #[serde(default = "default_order_status")]
    status: String,
    #[serde(rename = "type", default = "default_order_type")]
    order_type: String,
}

fn default_order_status() -> String {
    "active".to_string()
}

fn default_order_type() -> String {
    "dine-in".to_string()
}

fn validate(req: &OrderPayload) -> Result<(), AppError> {
    if !matches!(req.status.as_str(), "active" | "completed") {
        return Err(AppError::BadRequest(
            "status должен быть active | completed".to_string(),
        ));
    }
    if !matches!(req.order_type.as_str(), "dine-in" | "takeaway") {
        return Err(AppError::BadRequest(
            "type должен быть dine-in | takeaway".to_string(),
        ));
    }
    for item in &req.items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(
                "Количество каждой позиции должно быть не меньше 1".to_string(),
            ));
        }
        if !matches!(item.status.as_str(), "pending" | "preparing" | "ready") {
            return Err(AppError::BadRequest(
                "Статус позиции должен быть pending | preparing | ready".to_string(),
            ));
        }
    }
    Ok(())
}

// POST /api/order
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let mut tx = state.db.pool.begin().await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (table_number, staff_id, cash, upi, paid_amount, status, order_type)
         VALUES ($1, $2, $3, $4, $3 + $4, $5, $6)
         RETURNING id",
    )
    .bind(req.table_number)
    .bind(req.staff_id)
    .bind(req.cash)
    .bind(req.upi)
    .bind(&req.status)
    .bind(&req.order_type)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::BadRequest("Сотрудник не найден".to_string())
        }
        _ => AppError::Db(e),
    })?;

    for item in &req.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, item_id, quantity, status) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(item.item_id)
        .bind(item.quantity)
        .bind(&item.status)
        .execute(&mut *tx)
        .await
        .map_err(missing_item_to_bad_request)?;
    }

    recompute_total(&mut tx, order_id).await?;
    tx.commit().await?;

    let order = load_order(&state.db.pool, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Заказ не найден".to_string()))?;
    state.realtime.emit("postOrder", &order);
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
struct OrdersQuery {
    date: Option<String>,
}

// GET /api/order?date=YYYY-MM-DD - заказы за день (по умолчанию сегодня)
async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, end) = day_bounds(params.date.as_deref())?;

    let orders: Vec<Order> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE datetime >= $1 AND datetime <= $2 ORDER BY datetime DESC"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(&state.db.pool)
    .await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items: Vec<OrderItemView> = sqlx::query_as(
        "SELECT oi.id, oi.order_id, oi.item_id, m.name, m.price, oi.quantity, oi.status
         FROM order_items oi
         JOIN menu_items m ON m.id = oi.item_id
         WHERE oi.order_id = ANY($1)
         ORDER BY oi.id",
    )
    .bind(&ids)
    .fetch_all(&state.db.pool)
    .await?;

    let mut by_order: std::collections::HashMap<i64, Vec<OrderItemView>> =
        std::collections::HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    let response: Vec<OrderResponse> = orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderResponse { order, items }
        })
        .collect();

    Ok(Json(response))
}

// GET /api/order/{id}
async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = load_order(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Заказ с ID {} не найден", id)))?;
    Ok(Json(order))
}

// GET /api/order/table/{table_number} - активный заказ стола
async fn get_active_order_for_table(
    State(state): State<Arc<AppState>>,
    Path(table_number): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM orders
         WHERE table_number = $1 AND status = 'active'
         ORDER BY datetime DESC
         LIMIT 1",
    )
    .bind(table_number)
    .fetch_optional(&state.db.pool)
    .await?;

    let id = id.ok_or_else(|| {
        AppError::NotFound(format!("Активный заказ для стола {} не найден", table_number))
    })?;

    let order = load_order(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Заказ не найден".to_string()))?;
    Ok(Json(order))
}

// PUT /api/order/{id} - замена заказа вместе с позициями
async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<OrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let mut tx = state.db.pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE orders
         SET table_number = $1, staff_id = $2, cash = $3, upi = $4, status = $5, order_type = $6
         WHERE id = $7",
    )
    .bind(req.table_number)
    .bind(req.staff_id)
    .bind(req.cash)
    .bind(req.upi)
    .bind(&req.status)
    .bind(&req.order_type)
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::NotFound(format!("Заказ с ID {} не найден", id)));
    }

    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for item in &req.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, item_id, quantity, status) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(item.item_id)
        .bind(item.quantity)
        .bind(&item.status)
        .execute(&mut *tx)
        .await
        .map_err(missing_item_to_bad_request)?;
    }

    recompute_total(&mut tx, id).await?;
    tx.commit().await?;

    let order = load_order(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Заказ не найден".to_string()))?;
    state.realtime.emit("updateOrder", &order);
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
struct AddItemsRequest {
    #[serde(rename = "newItems")]
    new_items: Vec<NewItemEntry>,
}

#[derive(Debug, Deserialize)]
struct NewItemEntry {
    item_id: i64,
    quantity: i32,
}

// PUT /api/order/{id}/add-items - дозаказ с объединением количества
async fn add_items(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AddItemsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.new_items.is_empty() {
        return Err(AppError::BadRequest("Нужна хотя бы одна позиция".to_string()));
    }
    for item in &req.new_items {
        if item.quantity < 1 {
            return Err(AppError::BadRequest(
                "Количество каждой позиции должно быть не меньше 1".to_string(),
            ));
        }
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
        .bind(id)
        .fetch_one(&state.db.pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Заказ не найден".to_string()));
    }

    let mut tx = state.db.pool.begin().await?;

    for item in &req.new_items {
        // Уже заказанная позиция просто увеличивает количество
        let merged = sqlx::query(
            "UPDATE order_items SET quantity = quantity + $1 WHERE order_id = $2 AND item_id = $3",
        )
        .bind(item.quantity)
        .bind(id)
        .bind(item.item_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if merged == 0 {
            sqlx::query(
                "INSERT INTO order_items (order_id, item_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(item.item_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(missing_item_to_bad_request)?;
        }
    }

    recompute_total(&mut tx, id).await?;
    tx.commit().await?;

    let order = load_order(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Заказ не найден".to_string()))?;
    state.realtime.emit("updateOrderItems", &order);
    Ok(Json(order))
}

// DELETE /api/order/{id}
async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound(format!("Заказ с ID {} не найден", id)));
    }

    state.realtime.emit("deleteOrder", &json!({ "id": id }));
    Ok(Json(json!({ "message": "Заказ удалён" })))
}
