use std::collections::HashMap;

use redis::AsyncCommands;

use crate::cache::CacheService;
use crate::models::room::RoomWithSeats;
use crate::models::{Room, Seat};

impl CacheService {
    // Получить все комнаты вместе с местами
    pub async fn get_rooms(&self) -> Vec<RoomWithSeats> {
        // Сначала пробуем кеш
        if let Ok(rooms) = self.get_rooms_from_cache().await {
            return rooms;
        }

        // Если кеш не работает - идем в БД
        if let Ok(rooms) = self.load_rooms_from_db().await {
            let _ = self.save_rooms_to_cache(&rooms).await;
            return rooms;
        }

        vec![]
    }

    pub async fn load_rooms_from_db(&self) -> Result<Vec<RoomWithSeats>, sqlx::Error> {
        let rooms: Vec<Room> = sqlx::query_as(
            "SELECT id, room_code, staff_id, skipped_columns FROM rooms ORDER BY room_code",
        )
        .fetch_all(&self.db.pool)
        .await?;

        let seats: Vec<Seat> = sqlx::query_as(
            "SELECT id, room_id, seat_code, row_letter, col_number, status, student_id, exam_id
             FROM seats
             ORDER BY room_id, id",
        )
        .fetch_all(&self.db.pool)
        .await?;

        let mut by_room: HashMap<i64, Vec<Seat>> = HashMap::new();
        for seat in seats {
            by_room.entry(seat.room_id).or_default().push(seat);
        }

        Ok(rooms
            .into_iter()
            .map(|room| {
                let seats = by_room.remove(&room.id).unwrap_or_default();
                RoomWithSeats { room, seats }
            })
            .collect())
    }

    /// Сбрасывает кеш комнат и все производные схемы рассадки. Вызывается
    /// после каждой мутации комнаты: схема пересчитывается только когда
    /// комната действительно изменилась.
    pub async fn invalidate_rooms(&self) {
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.del("rooms").await;

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg("seating:*")
            .query_async(&mut conn)
            .await
            .unwrap_or_default();

        if !keys.is_empty() {
            let mut pipe = redis::pipe();
            for key in &keys {
                pipe.del(key);
            }
            let _: Result<(), _> = pipe.query_async(&mut conn).await;
        }
    }

    /// Закешированная схема рассадки комнаты, если она ещё актуальна.
    pub async fn get_cached_seating(&self, room_id: i64) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        conn.get(format!("seating:{}", room_id)).await
    }

    pub async fn cache_seating(&self, room_id: i64, json: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        conn.set_ex(format!("seating:{}", room_id), json, self.ttl_seconds)
            .await
    }

    // === Работа с кешем ===
    async fn get_rooms_from_cache(&self) -> Result<Vec<RoomWithSeats>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: String = conn.get("rooms").await?;
        let rooms: Vec<RoomWithSeats> = serde_json::from_str(&data).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
        })?;
        Ok(rooms)
    }

    async fn save_rooms_to_cache(&self, rooms: &[RoomWithSeats]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(rooms).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex("rooms", data, self.ttl_seconds).await
    }
}
