use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

/// Фоновая очистка устаревших заказов. Раньше за это отвечал TTL-индекс
/// в базе; здесь тот же срок хранения выдерживает периодическая задача.
pub struct CleanupService {
    state: Arc<AppState>,
}

impl CleanupService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Одна итерация очистки: удаляет заказы старше срока хранения.
    /// Позиции заказов уходят каскадом.
    pub async fn run(&self) {
        let retention_days = self.state.config.cleanup.order_retention_days;
        let cutoff = Utc::now() - Duration::days(retention_days);

        let deleted: Vec<i64> =
            sqlx::query_scalar("DELETE FROM orders WHERE datetime < $1 RETURNING id")
                .bind(cutoff)
                .fetch_all(&self.state.db.pool)
                .await
                .unwrap_or_else(|e| {
                    error!("order cleanup failed: {:?}", e);
                    vec![]
                });

        if deleted.is_empty() {
            info!("🧹 No expired orders to cleanup");
        } else {
            info!(
                "🧹 Removed {} orders older than {} days",
                deleted.len(),
                retention_days
            );
        }
    }

    /// Количество заказов, ожидающих очистки. Для мониторинга.
    pub async fn pending_count(&self) -> i64 {
        let cutoff = Utc::now() - Duration::days(self.state.config.cleanup.order_retention_days);
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE datetime < $1")
            .bind(cutoff)
            .fetch_one(&self.state.db.pool)
            .await
            .unwrap_or(0)
    }
}
