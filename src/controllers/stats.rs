//! stats.rs
//!
//! Модуль статистики продаж.
//!
//! Включает в себя следующую функциональность:
//! - Сводка за один день: количество заказов, разбивка dine-in/takeaway,
//!   выручка, способы оплаты, продажи по позициям и самая/наименее
//!   продаваемая позиция.
//! - Сводка за период: те же показатели по каждому дню плюс общий итог,
//!   дни без заказов пропускаются.
//!
//! Сама свёртка - чистая функция над строками (заказ, позиция), SQL
//! только выбирает строки за окно времени.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::controllers::orders::{date_bounds, day_bounds};
use crate::error::AppError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/order/stat/stat", get(day_stats))
        .route("/order/statRange/{start_date}/{end_date}", get(range_stats))
}

/* ---------- чистая свёртка ---------- */

/// Одна строка выборки: заказ и одна его позиция (или NULL для заказа
/// без позиций из-за LEFT JOIN).
#[derive(Debug, Clone, FromRow)]
pub struct StatRow {
    pub order_id: i64,
    pub order_type: String,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub cash: f64,
    pub upi: f64,
    pub item_name: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_orders: i64,
    pub total_orders_dine_in: i64,
    pub total_orders_takeaway: i64,
    pub total_amount: f64,
    pub total_paid_amount: f64,
    pub paid_upi: f64,
    pub paid_cash: f64,
    pub total_items_sold: i64,
    pub item_sales: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSale {
    pub name: String,
    pub quantity: i64,
}

/// Сворачивает строки (заказ, позиция) в сводку. Заказ учитывается один
/// раз независимо от числа его позиций.
pub fn summarize(rows: &[StatRow]) -> StatsSummary {
    let mut summary = StatsSummary::default();
    let mut seen_orders: HashSet<i64> = HashSet::new();

    for row in rows {
        if seen_orders.insert(row.order_id) {
            summary.total_orders += 1;
            match row.order_type.as_str() {
                "dine-in" => summary.total_orders_dine_in += 1,
                "takeaway" => summary.total_orders_takeaway += 1,
                _ => {}
            }
            summary.total_amount += row.total_amount;
            summary.total_paid_amount += row.paid_amount;
            summary.paid_upi += row.upi;
            summary.paid_cash += row.cash;
        }

        if let (Some(name), Some(quantity)) = (&row.item_name, row.quantity) {
            summary.total_items_sold += quantity as i64;
            *summary.item_sales.entry(name.clone()).or_insert(0) += quantity as i64;
        }
    }

    summary
}

/// Самая и наименее продаваемая позиция. Для единственной позиции обе
/// ссылки указывают на неё.
pub fn best_and_worst(summary: &StatsSummary) -> (Option<ItemSale>, Option<ItemSale>) {
    let most = summary
        .item_sales
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, quantity)| ItemSale {
            name: name.clone(),
            quantity: *quantity,
        });
    let least = summary
        .item_sales
        .iter()
        .min_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, quantity)| ItemSale {
            name: name.clone(),
            quantity: *quantity,
        });
    (most, least)
}

impl StatsSummary {
    /// Добавляет дневную сводку к общему итогу.
    pub fn merge(&mut self, other: &StatsSummary) {
        self.total_orders += other.total_orders;
        self.total_orders_dine_in += other.total_orders_dine_in;
        self.total_orders_takeaway += other.total_orders_takeaway;
        self.total_amount += other.total_amount;
        self.total_paid_amount += other.total_paid_amount;
        self.paid_upi += other.paid_upi;
        self.paid_cash += other.paid_cash;
        self.total_items_sold += other.total_items_sold;
        for (name, quantity) in &other.item_sales {
            *self.item_sales.entry(name.clone()).or_insert(0) += quantity;
        }
    }
}

/* ---------- handlers ---------- */

async fn fetch_rows(
    pool: &sqlx::PgPool,
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<StatRow>, sqlx::Error> {
    sqlx::query_as(
        "SELECT o.id as order_id, o.order_type, o.total_amount, o.paid_amount, o.cash, o.upi,
                m.name as item_name, oi.quantity
         FROM orders o
         LEFT JOIN order_items oi ON oi.order_id = o.id
         LEFT JOIN menu_items m ON m.id = oi.item_id
         WHERE o.datetime >= $1 AND o.datetime <= $2
         ORDER BY o.id, oi.id",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

#[derive(Debug, Deserialize)]
struct StatQuery {
    date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayStatsResponse {
    #[serde(flatten)]
    summary: StatsSummary,
    most_sold_item: Option<ItemSale>,
    least_sold_item: Option<ItemSale>,
}

// GET /api/order/stat/stat?date=YYYY-MM-DD
async fn day_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (start, end) = day_bounds(params.date.as_deref())?;
    let rows = fetch_rows(&state.db.pool, start, end).await?;

    let summary = summarize(&rows);
    let (most_sold_item, least_sold_item) = best_and_worst(&summary);

    Ok(Json(DayStatsResponse {
        summary,
        most_sold_item,
        least_sold_item,
    }))
}

#[derive(Debug, Serialize)]
struct DailyStats {
    date: String,
    #[serde(flatten)]
    summary: StatsSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeStatsResponse {
    daily_stats: Vec<DailyStats>,
    overall_stats: StatsSummary,
}

// GET /api/order/statRange/{start}/{end}
async fn range_stats(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let parse = |raw: &str| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest("Неверный формат даты. Ожидается YYYY-MM-DD.".to_string())
        })
    };
    let start = parse(&start_date)?;
    let end = parse(&end_date)?;
    if start > end {
        return Err(AppError::BadRequest(
            "Начальная дата позже конечной".to_string(),
        ));
    }

    let mut daily_stats = Vec::new();
    let mut overall_stats = StatsSummary::default();

    let mut current = start;
    while current <= end {
        let (day_start, day_end) = date_bounds(current);
        let rows = fetch_rows(&state.db.pool, day_start, day_end).await?;

        // Дни без заказов в отчёт не попадают
        if !rows.is_empty() {
            let summary = summarize(&rows);
            overall_stats.merge(&summary);
            daily_stats.push(DailyStats {
                date: current.format("%Y-%m-%d").to_string(),
                summary,
            });
        }

        current = current.succ_opt().ok_or_else(|| {
            AppError::BadRequest("Неверный диапазон дат".to_string())
        })?;
    }

    Ok(Json(RangeStatsResponse {
        daily_stats,
        overall_stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order_id: i64, order_type: &str, item: Option<(&str, i32)>) -> StatRow {
        StatRow {
            order_id,
            order_type: order_type.to_string(),
            total_amount: 100.0,
            paid_amount: 80.0,
            cash: 50.0,
            upi: 30.0,
            item_name: item.map(|(name, _)| name.to_string()),
            quantity: item.map(|(_, q)| q),
        }
    }

    #[test]
    fn orders_are_counted_once_across_item_rows() {
        let rows = vec![
            row(1, "dine-in", Some(("Tea", 2))),
            row(1, "dine-in", Some(("Dosa", 1))),
            row(2, "takeaway", Some(("Tea", 3))),
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_orders_dine_in, 1);
        assert_eq!(summary.total_orders_takeaway, 1);
        assert_eq!(summary.total_amount, 200.0);
        assert_eq!(summary.total_paid_amount, 160.0);
        assert_eq!(summary.paid_cash, 100.0);
        assert_eq!(summary.paid_upi, 60.0);
        assert_eq!(summary.total_items_sold, 6);
        assert_eq!(summary.item_sales.get("Tea"), Some(&5));
        assert_eq!(summary.item_sales.get("Dosa"), Some(&1));
    }

    #[test]
    fn orders_without_items_still_count() {
        let rows = vec![row(1, "dine-in", None)];
        let summary = summarize(&rows);

        assert_eq!(summary.total_orders, 1);
        assert_eq!(summary.total_items_sold, 0);
        assert!(summary.item_sales.is_empty());
    }

    #[test]
    fn empty_input_gives_default_summary() {
        assert_eq!(summarize(&[]), StatsSummary::default());
    }

    #[test]
    fn best_and_worst_items() {
        let rows = vec![
            row(1, "dine-in", Some(("Tea", 5))),
            row(1, "dine-in", Some(("Dosa", 1))),
            row(2, "dine-in", Some(("Idli", 3))),
        ];
        let summary = summarize(&rows);
        let (most, least) = best_and_worst(&summary);

        assert_eq!(
            most,
            Some(ItemSale {
                name: "Tea".to_string(),
                quantity: 5
            })
        );
        assert_eq!(
            least,
            Some(ItemSale {
                name: "Dosa".to_string(),
                quantity: 1
            })
        );
    }

    #[test]
    fn single_item_is_both_best_and_worst() {
        let rows = vec![row(1, "dine-in", Some(("Tea", 2)))];
        let summary = summarize(&rows);
        let (most, least) = best_and_worst(&summary);
        assert_eq!(most, least);
        assert!(most.is_some());
    }

    #[test]
    fn no_items_mean_no_extremes() {
        let summary = summarize(&[row(1, "dine-in", None)]);
        let (most, least) = best_and_worst(&summary);
        assert!(most.is_none());
        assert!(least.is_none());
    }

    #[test]
    fn merge_accumulates_totals_and_item_sales() {
        let mut overall = summarize(&[row(1, "dine-in", Some(("Tea", 2)))]);
        let day_two = summarize(&[
            row(2, "takeaway", Some(("Tea", 1))),
            row(2, "takeaway", Some(("Dosa", 4))),
        ]);
        overall.merge(&day_two);

        assert_eq!(overall.total_orders, 2);
        assert_eq!(overall.total_orders_takeaway, 1);
        assert_eq!(overall.total_items_sold, 7);
        assert_eq!(overall.item_sales.get("Tea"), Some(&3));
        assert_eq!(overall.item_sales.get("Dosa"), Some(&4));
    }

    #[test]
    fn unknown_order_type_counts_in_total_only() {
        let summary = summarize(&[row(1, "delivery", None)]);
        assert_eq!(summary.total_orders, 1);
        assert_eq!(summary.total_orders_dine_in, 0);
        assert_eq!(summary.total_orders_takeaway, 0);
    }
}
