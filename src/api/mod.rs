pub mod complaints;
pub mod dashboard;
pub mod payments;
pub mod properties;
pub mod session;
pub mod tenants;

use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{session_middleware, AppState};
use crate::openapi::ApiDoc;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/session", session::routes())
        .nest("/properties", properties::routes())
        .nest("/payments", payments::routes())
        .nest("/complaints", complaints::routes())
        .nest("/tenants", tenants::routes())
        .nest("/dashboard", dashboard::routes())
}

/// Full application router: API, docs, health and the shared layers.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "HomeRent API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Rental property, rent and complaint management for small owners"
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
