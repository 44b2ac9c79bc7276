use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub table_number: i32,
    pub staff_id: i64,
    pub total_amount: f64,
    pub cash: f64,
    pub upi: f64,
    // Всегда cash + upi, пересчитывается сервером при каждой записи.
    pub paid_amount: f64,
    // active | completed
    pub status: String,
    // dine-in | takeaway
    #[serde(rename = "type")]
    pub order_type: String,
    pub datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: i32,
    // pending | preparing | ready
    pub status: String,
}
