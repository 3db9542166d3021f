use crate::routes::health::health_routes;
use crate::routes::webhook::webhook_routes;
use crate::state::AppState;
use axum::Router;
use seasonarr::SeasonReconciler;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub type AppRouter = Router<AppState>;

pub fn create_app(reconciler: Arc<SeasonReconciler>) -> Router {
    let app_state = AppState { reconciler };

    Router::new()
        .nest("/webhook", webhook_routes())
        .nest("/health", health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
