//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Auth:
///   - POST /api/auth/register - Register a user
///   - POST /api/auth/login - Log in
///
/// - Checkout:
///   - POST /test-add-item - Create an item
///   - POST /initialize-esewa - Create a pending purchase + signed payload
///   - GET  /complete-payment - Gateway completion callback
///
/// - Static pages:
///   - GET /payment/success - Success page
///   - GET /payment/failure - Failure page
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for now
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Payment result pages
    let payment_routes = Router::new()
        .route("/success", get(handlers::payment_success))
        .route("/failure", get(handlers::payment_failure));

    // Combine all routes
    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Auth
        .nest("/api/auth", auth_routes)
        // Checkout flow
        .route("/test-add-item", post(handlers::add_item))
        .route("/initialize-esewa", post(handlers::initialize_checkout))
        .route("/complete-payment", get(handlers::complete_payment))
        // Payment result pages
        .nest("/payment", payment_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
