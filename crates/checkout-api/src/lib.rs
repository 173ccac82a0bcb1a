//! # checkout-api
//!
//! HTTP API layer for esewa-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Auth endpoints (register/login with JWT issuance)
//! - Checkout initiation and the gateway completion callback
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/auth/register` | Register a user |
//! | POST | `/api/auth/login` | Log in |
//! | POST | `/test-add-item` | Create an item |
//! | POST | `/initialize-esewa` | Initialize a checkout |
//! | GET | `/complete-payment` | Gateway completion callback |

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, AuthConfig};
