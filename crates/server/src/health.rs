use api_types::health::Health;
use axum::Json;

/// Liveness probe. It does not touch the database.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        message: "campus risk service is running".to_string(),
    })
}
