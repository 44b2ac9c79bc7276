use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hall_system::{
    cache::CacheService,
    config::Config,
    controllers,
    database::Database,
    realtime::{self, ChangeFeed},
    redis_client::RedisClient,
    seating::SeatingTheme,
    services::cleanup::CleanupService,
    AppState,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hall System API");

    // Connect to the database
    let db = Database::new(&config.database.url, config.database.pool_size)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    // Run migrations
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    // Connect to Redis
    let redis = RedisClient::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;
    info!("Redis connected");

    // Initialize the cache
    let cache = CacheService::new(redis.clone(), db.clone(), config.redis.cache_ttl_seconds);
    cache.warmup_cache().await;
    info!("Cache warmed up");

    // Create the shared application state
    let app_state = Arc::new(AppState {
        db: db.clone(),
        redis: redis.clone(),
        cache,
        realtime: ChangeFeed::new(256),
        config: config.clone(),
        seating_theme: SeatingTheme::default(),
    });

    // --- Start background tasks ---

    // Task to remove expired orders on an interval
    if config.features.enable_cleanup {
        let cleanup = CleanupService::new(app_state.clone());
        let interval = config.cleanup.interval_seconds;
        task::spawn(async move {
            loop {
                cleanup.run().await;
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        });
    }

    // --- Start the web server ---

    // Фронтенд ходит с другого origin, ключ передаётся заголовком
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")]);

    // Create the main router
    let mut app = Router::new()
        .route("/", get(|| async { "Hall System API v1.0" }))
        .route("/health", get(health))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes(app_state.clone()));

    // Лента изменений для открытых вкладок
    if config.features.enable_realtime {
        app = app.route("/ws", get(realtime::ws_handler));
    }

    let app = app
        // Pass the application state to the router
        .with_state(app_state.clone())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    if !state.db.ping().await {
        return (StatusCode::SERVICE_UNAVAILABLE, "DB unavailable");
    }
    if !state.redis.ping().await {
        return (StatusCode::SERVICE_UNAVAILABLE, "Redis unavailable");
    }
    (StatusCode::OK, "OK")
}
