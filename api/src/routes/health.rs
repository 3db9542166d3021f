use crate::app::AppRouter;
use axum::{Json, routing::get};
use chrono::Utc;
use serde_json::{Value, json};

pub const SERVICE_NAME: &str = "seasonarr";

pub fn health_routes() -> AppRouter {
    AppRouter::new().route("/", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
    }))
}
