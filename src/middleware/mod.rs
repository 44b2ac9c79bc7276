use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Доступ к API защищён одним общим ключом в заголовке x-api-key.
/// Никакой пользовательской модели за этим нет.
#[derive(Debug, Clone)]
pub struct ApiKey;

impl FromRequestParts<Arc<crate::AppState>> for ApiKey {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(key) if key == state.config.api.key => Ok(ApiKey),
            _ => Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Forbidden: Invalid API key" })),
            )),
        }
    }
}
