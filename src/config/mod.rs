use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub api: ApiConfig,
    pub cleanup: CleanupConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки Redis
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub cache_ttl_seconds: u64,
}

// Доступ к API: один общий ключ в заголовке x-api-key
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub key: String,
}

// Настройки фоновой очистки старых заказов
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    pub order_retention_days: i64,
    pub interval_seconds: u64,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_realtime: bool,
    pub enable_cleanup: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "hall_system=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
                cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .expect("CACHE_TTL_SECONDS must be a valid number"),
            },
            api: ApiConfig {
                key: env::var("API_KEY").expect("API_KEY must be set"),
            },
            cleanup: CleanupConfig {
                // Раньше за это отвечал TTL-индекс в базе: полгода
                order_retention_days: env::var("ORDER_RETENTION_DAYS")
                    .unwrap_or_else(|_| "180".to_string())
                    .parse()
                    .expect("ORDER_RETENTION_DAYS must be a valid number"),
                interval_seconds: env::var("CLEANUP_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .expect("CLEANUP_INTERVAL_SECONDS must be a valid number"),
            },
            features: FeatureFlags {
                enable_realtime: env::var("ENABLE_REALTIME")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .expect("ENABLE_REALTIME must be true or false"),
                enable_cleanup: env::var("ENABLE_CLEANUP")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .expect("ENABLE_CLEANUP must be true or false"),
            },
        }
    }
}
