//! # eSewa Checkout RS
//!
//! Checkout backend with eSewa payment verification.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ESEWA_SECRET_KEY=8gBm/:&EnhH.1/q
//! export ESEWA_PRODUCT_CODE=EPAYTEST
//! export ESEWA_GATEWAY_URL=https://rc.esewa.com.np
//! export ESEWA_SUCCESS_URL=http://localhost:8080/payment/success
//! export ESEWA_FAILURE_URL=http://localhost:8080/payment/failure
//! export JWT_SECRET=change-me
//!
//! # Run the server
//! esewa-checkout
//! ```

use checkout_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment gateway: {}", state.gateway.gateway_name());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("eSewa checkout server starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Checkout: POST http://{}/initialize-esewa", addr);
        info!("Callback: GET http://{}/complete-payment", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
