use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_batch_handler, create_handler, create_json_handler, delete_batch_handler,
    list_handler, ping_handler, resolve_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(ping_handler))
            .route("/", post(create_handler))
            .route("/{id}", get(resolve_handler))
            .route("/api/shorten", post(create_json_handler))
            .route("/api/shorten/batch", post(create_batch_handler))
            .route(
                "/api/user/urls",
                get(list_handler).delete(delete_batch_handler),
            )
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(RequestDecompressionLayer::new())
            .with_state(state)
    }
}
