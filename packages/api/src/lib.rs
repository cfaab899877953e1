use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state};
use middleware::jwt::jwt_middleware;
use state::State;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, decompression::RequestDecompressionLayer,
};

pub mod checkout;
pub mod config;
pub mod entity;
pub mod error;
pub mod mail;
mod middleware;
pub mod openapi;
pub mod providers;
mod routes;
pub mod state;

pub use axum;
pub use sea_orm;

pub mod auth {
    pub use crate::middleware::jwt::AppUser;
}

pub fn construct_router(state: Arc<State>) -> Router {
    let router = Router::new()
        .nest("/health", routes::health::routes())
        .nest("/payments", routes::payments::routes())
        .nest("/orders", routes::orders::routes())
        .nest("/enrollments", routes::enrollments::routes())
        .route(
            "/openapi.json",
            axum::routing::get(|| async { axum::Json(openapi::openapi()) }),
        )
        .with_state(state.clone())
        .layer(from_fn_with_state(state, jwt_middleware))
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new()),
        );

    Router::new().nest("/api", router)
}
