use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub course_code: String,
    pub course_name: Option<String>,
    pub date: NaiveDateTime,
    // not-published | published
    pub seating: String,
    // upcoming | ongoing | end
    pub status: String,
}
