use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Printer {
    pub id: i64,
    pub printer_name: String,
    // Dish | Beverage | Bill, одно назначение на тип.
    pub printer_type: String,
}
