pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings.clone());

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Auth routes
        .nest("/auth", auth_routes(app_state.clone()))
        // Notice API
        .nest("/api/notices", notice_routes(app_state.clone()))
        // Locally stored attachments
        .nest_service("/uploads", ServeDir::new(&settings.uploads.dir))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let authed = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let admin = Router::new()
        .route("/users", post(handlers::auth::create_user))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ));

    Router::new()
        .route("/login", post(handlers::auth::login))
        .merge(authed)
        .merge(admin)
}

fn notice_routes(state: AppState) -> Router<AppState> {
    // Public reads: visibility rules still apply, so the optional_auth layer
    // attaches the caller when a token is present.
    let public = Router::new()
        .route("/", get(handlers::notices::list))
        .route("/:id", get(handlers::notices::get))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::optional_auth,
        ));

    let staff = Router::new()
        .route("/", post(handlers::notices::create))
        .route("/mine", get(handlers::notices::mine))
        .route("/:id", put(handlers::notices::update))
        .route("/:id", delete(handlers::notices::delete))
        .route("/:id/submit", patch(handlers::notices::submit))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let admin = Router::new()
        .route("/pending", get(handlers::notices::pending))
        .route("/:id/approve", patch(handlers::notices::approve))
        .route("/:id/reject", patch(handlers::notices::reject))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ));

    public.merge(staff).merge(admin)
}
