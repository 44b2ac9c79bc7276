use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Printer;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/printer/set", post(set_printer))
        .route("/printer/get/{printer_type}", get(get_printer))
}

#[derive(Debug, Deserialize)]
struct SetPrinterRequest {
    printer_name: String,
    printer_type: String,
}

// POST /api/printer/set - одно назначение принтера на тип
async fn set_printer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetPrinterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !matches!(req.printer_type.as_str(), "Dish" | "Beverage" | "Bill") {
        return Err(AppError::BadRequest(
            "printer_type должен быть Dish | Beverage | Bill".to_string(),
        ));
    }

    let printer: Printer = sqlx::query_as(
        "INSERT INTO printers (printer_name, printer_type)
         VALUES ($1, $2)
         ON CONFLICT (printer_type) DO UPDATE SET printer_name = EXCLUDED.printer_name
         RETURNING id, printer_name, printer_type",
    )
    .bind(&req.printer_name)
    .bind(&req.printer_type)
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(printer))
}

// GET /api/printer/get/{type}
async fn get_printer(
    State(state): State<Arc<AppState>>,
    Path(printer_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let printer: Option<Printer> = sqlx::query_as(
        "SELECT id, printer_name, printer_type FROM printers WHERE printer_type = $1",
    )
    .bind(&printer_type)
    .fetch_optional(&state.db.pool)
    .await?;

    let printer = printer.ok_or_else(|| {
        AppError::NotFound(format!("Принтер для типа {} не назначен", printer_type))
    })?;
    Ok(Json(printer))
}
