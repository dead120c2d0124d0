use std::sync::Arc;

use axum::{Router, http::Method, middleware, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    server::AppState,
    transport::{
        middleware::add_response_headers,
        routes::{download, home, info, search},
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(home::index))
        .route("/info", get(info::get_info))
        .route("/recherche", get(search::search_videos))
        .route("/download", get(download::download))
        .layer(middleware::from_fn(add_response_headers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
