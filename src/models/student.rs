use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::NaiveDate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub reg_no: String,
    pub name: Option<String>,
    pub roll_no: Option<i32>,
    pub semester: Option<String>,
    pub department: Option<String>,
    pub dob: NaiveDate,
    #[serde(skip_serializing)]
    pub password: String,
    pub staff_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudentExam {
    pub id: i64,
    pub student_id: i64,
    pub exam_id: i64,
    pub status: String,
}
