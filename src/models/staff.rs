use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub staff_code: String,
    pub name: String,
    pub department: String,
    #[serde(skip_serializing)]
    pub password: String,
}
