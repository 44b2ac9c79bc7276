use crate::{database::Database, redis_client::RedisClient};
use tracing::info;

pub mod menu;
pub mod rooms;

#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    db: Database,
    ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: RedisClient, db: Database, ttl_seconds: u64) -> Self {
        Self {
            redis,
            db,
            ttl_seconds,
        }
    }

    // Прогрев кеша при старте
    pub async fn warmup_cache(&self) {
        info!("Starting cache warmup...");

        // Загружаем комнаты с местами
        let _ = self.get_rooms().await;

        // Загружаем меню
        let _ = self.get_menu().await;

        info!("Cache warmup done");
    }
}
