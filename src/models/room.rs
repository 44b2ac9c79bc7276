use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub room_code: String,
    pub staff_id: Option<i64>,
    // Letters deliberately left out when seats were generated, as a
    // comma-separated list ("D,G"). NULL on rooms created before this
    // was recorded.
    pub skipped_columns: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub room_id: i64,
    pub seat_code: String,
    // Legacy seats carry only seat_code; position is re-derived from it.
    pub row_letter: Option<String>,
    pub col_number: Option<i32>,
    // Available | Occupied
    pub status: String,
    pub student_id: Option<i64>,
    pub exam_id: Option<i64>,
}

/// Полная комната вместе со списком мест, как её отдаёт API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomWithSeats {
    #[serde(flatten)]
    pub room: Room,
    pub seats: Vec<Seat>,
}
