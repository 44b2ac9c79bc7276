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
use crate::models::MenuItem;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/menu", get(list_menu).post(create_item))
        .route(
            "/menu/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[derive(Debug, Deserialize)]
struct MenuPayload {
    name: String,
    category: String,
    #[serde(rename = "group")]
    group_name: Option<String>,
    price: f64,
}

fn validate(req: &MenuPayload) -> Result<(), AppError> {
    if !matches!(req.category.as_str(), "Dish" | "Beverage") {
        return Err(AppError::BadRequest(
            "category должен быть Dish | Beverage".to_string(),
        ));
    }
    if req.price < 0.0 {
        return Err(AppError::BadRequest("Цена не может быть отрицательной".to_string()));
    }
    Ok(())
}

// POST /api/menu
async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MenuPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let item: MenuItem = sqlx::query_as(
        "INSERT INTO menu_items (name, category, group_name, price)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, category, group_name, price",
    )
    .bind(&req.name)
    .bind(&req.category)
    .bind(&req.group_name)
    .bind(req.price)
    .fetch_one(&state.db.pool)
    .await?;

    state.cache.invalidate_menu().await;
    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/menu
async fn list_menu(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.cache.get_menu().await)
}

// GET /api/menu/{id}
async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let item: Option<MenuItem> =
        sqlx::query_as("SELECT id, name, category, group_name, price FROM menu_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db.pool)
            .await?;

    let item = item.ok_or_else(|| AppError::NotFound("Позиция меню не найдена".to_string()))?;
    Ok(Json(item))
}

// PUT /api/menu/{id}
async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MenuPayload>,
) -> Result<impl IntoResponse, AppError> {
    validate(&req)?;

    let item: Option<MenuItem> = sqlx::query_as(
        "UPDATE menu_items
         SET name = $1, category = $2, group_name = $3, price = $4
         WHERE id = $5
         RETURNING id, name, category, group_name, price",
    )
    .bind(&req.name)
    .bind(&req.category)
    .bind(&req.group_name)
    .bind(req.price)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?;

    let item = item.ok_or_else(|| AppError::NotFound("Позиция меню не найдена".to_string()))?;
    state.cache.invalidate_menu().await;
    Ok(Json(item))
}

// DELETE /api/menu/{id}
async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sqlx::query("DELETE FROM menu_items WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Позиция меню не найдена".to_string()));
    }

    state.cache.invalidate_menu().await;
    Ok(Json(json!({ "message": "Позиция меню удалена" })))
}
