use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    pub table_number: i32,
    // Available | Occupied
    pub status: String,
    pub staff_id: Option<i64>,
    // connected | disconnected
    pub conn: String,
}
