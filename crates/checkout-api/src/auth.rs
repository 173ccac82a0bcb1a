//! # Auth Controller
//!
//! Registration and login with JWT issuance. Passwords are stored as
//! bcrypt hashes and verified with `bcrypt::verify`; a plaintext
//! credential never reaches the store.

use crate::handlers::ErrorResponse;
use crate::state::{AppState, AuthConfig};
use axum::{extract::State, http::StatusCode, Json};
use bcrypt::DEFAULT_COST;
use checkout_core::{CheckoutError, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// JWT claims: subject is the user id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Auth response returned by both register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Issue a signed JWT for a user id
pub fn generate_token(user_id: &str, auth: &AuthConfig) -> Result<String, CheckoutError> {
    let expiration = Utc::now() + Duration::hours(auth.jwt_expires_in_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| CheckoutError::Internal(format!("token signing failed: {}", e)))
}

/// Register a new user
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    for (field, value) in [
        ("firstname", &request.firstname),
        ("lastname", &request.lastname),
        ("email", &request.email),
        ("password", &request.password),
    ] {
        if value.trim().is_empty() {
            return Err(bad_request(format!("{} is required", field)));
        }
    }

    let name = format!("{} {}", request.firstname.trim(), request.lastname.trim());

    let password_hash = bcrypt::hash(&request.password, DEFAULT_COST).map_err(|e| {
        warn!("bcrypt hash error: {}", e);
        internal_error()
    })?;

    let user = state
        .store
        .insert_user(User::new(name, request.email.trim(), password_hash))
        .map_err(|_| bad_request("User already exists".to_string()))?;

    let token = token_or_500(&user, &state.auth)?;

    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

/// Log in an existing user
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .store
        .find_user_by_email(request.email.trim())
        .ok_or_else(invalid_credentials)?;

    let valid = bcrypt::verify(&request.password, &user.password_hash).map_err(|e| {
        warn!("bcrypt verify error: {}", e);
        internal_error()
    })?;
    if !valid {
        return Err(invalid_credentials());
    }

    let token = token_or_500(&user, &state.auth)?;

    Ok(Json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

fn token_or_500(
    user: &User,
    auth: &AuthConfig,
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    generate_token(&user.id, auth).map_err(|e| {
        warn!("token generation failed: {}", e);
        internal_error()
    })
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message, 400)))
}

fn invalid_credentials() -> (StatusCode, Json<ErrorResponse>) {
    bad_request("Invalid email or password".to_string())
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Server error", 500)),
    )
}
