pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod redis_client;
pub mod seating;
pub mod services;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub redis: redis_client::RedisClient,
    pub cache: cache::CacheService,
    pub realtime: realtime::ChangeFeed,
    pub config: config::Config,
    pub seating_theme: seating::SeatingTheme,
}
