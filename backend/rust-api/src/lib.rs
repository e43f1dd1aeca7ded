#![allow(dead_code)]

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    // Play-mode endpoints are public; the publish-flag gate lives in the
    // service layer.
    let public_routes = Router::new()
        .route(
            "/api/v1/games/{kind}/{id}/play",
            get(handlers::games::get_game_play),
        )
        .route(
            "/api/v1/games/{kind}/{id}/check-answer",
            axum::routing::post(handlers::games::check_answers),
        );

    // Authoring endpoints require a JWT; ownership checks happen in the
    // service layer.
    let protected_routes = Router::new()
        .route(
            "/api/v1/games/{kind}",
            axum::routing::post(handlers::games::create_game).get(handlers::games::list_games),
        )
        .route(
            "/api/v1/games/{kind}/{id}",
            get(handlers::games::get_game_detail)
                .put(handlers::games::update_game)
                .delete(handlers::games::delete_game),
        )
        .route(
            "/api/v1/games/{kind}/{id}/preview",
            get(handlers::games::preview_game_play),
        )
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            middlewares::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
