use redis::AsyncCommands;

use crate::cache::CacheService;
use crate::models::MenuItem;

impl CacheService {
    // Получить меню
    pub async fn get_menu(&self) -> Vec<MenuItem> {
        if let Ok(items) = self.get_menu_from_cache().await {
            return items;
        }

        if let Ok(items) = self.load_menu_from_db().await {
            let _ = self.save_menu_to_cache(&items).await;
            return items;
        }

        vec![]
    }

    pub async fn load_menu_from_db(&self) -> Result<Vec<MenuItem>, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(
            "SELECT id, name, category, group_name, price FROM menu_items ORDER BY name",
        )
        .fetch_all(&self.db.pool)
        .await
    }

    pub async fn invalidate_menu(&self) {
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.del("menu").await;
    }

    async fn get_menu_from_cache(&self) -> Result<Vec<MenuItem>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: String = conn.get("menu").await?;
        let items: Vec<MenuItem> = serde_json::from_str(&data).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error"))
        })?;
        Ok(items)
    }

    async fn save_menu_to_cache(&self, items: &[MenuItem]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(items).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex("menu", data, self.ttl_seconds).await
    }
}
