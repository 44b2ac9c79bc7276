use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    // Dish | Beverage
    pub category: String,
    pub group_name: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MenuGroup {
    pub id: i64,
    pub name: String,
}
