use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &ServerConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(receipt_routes(config))
        .routes(routes!(handlers::health::health))
}

fn receipt_routes(config: &ServerConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::receipt::create_receipt,
            handlers::receipt::missing_receipt_id
        ))
        .routes(routes!(handlers::receipt::get_receipt))
        .route("/receipts/", get(handlers::receipt::missing_receipt_id))
        .layer(handlers::receipt::receipt_upload_body_limit(
            config.max_upload_bytes,
        ))
}
