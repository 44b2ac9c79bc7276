pub mod exams;
pub mod groups;
pub mod menu;
pub mod orders;
pub mod printers;
pub mod rooms;
pub mod staff;
pub mod stats;
pub mod students;
pub mod tables;

use axum::{middleware::from_extractor_with_state, Router};
use std::sync::Arc;

use crate::middleware::ApiKey;

pub fn routes(state: Arc<crate::AppState>) -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(staff::routes())
        .merge(exams::routes())
        .merge(students::routes())
        .merge(rooms::routes())
        .merge(menu::routes())
        .merge(groups::routes())
        .merge(orders::routes())
        .merge(stats::routes())
        .merge(tables::routes())
        .merge(printers::routes())
        // Весь /api закрыт общим ключом, как и в исходном сервере
        .route_layer(from_extractor_with_state::<ApiKey, Arc<crate::AppState>>(state))
}
