//! # Checkout Error Types
//!
//! Typed error handling for the esewa-checkout backend.
//! All checkout operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Item not found in the store
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: String },

    /// Requested total price does not match the stored item price
    #[error("Price mismatch: expected {expected}, received {received}")]
    PriceMismatch { expected: f64, received: f64 },

    /// Purchase record not found for a gateway transaction
    #[error("Purchase not found: {transaction_uuid}")]
    PurchaseNotFound { transaction_uuid: String },

    /// A user with this email is already registered
    #[error("User already exists: {email}")]
    UserExists { email: String },

    /// Login with unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Callback payload could not be base64-decoded or parsed
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Recomputed callback signature does not match the provided one
    #[error("Signature mismatch: invalid payment info")]
    SignatureMismatch {
        /// Transaction the callback claimed to belong to, when it decoded
        transaction_uuid: Option<String>,
    },

    /// Remote status check rejected the transaction
    #[error("Transaction verification failed: {reason}")]
    VerificationFailed {
        transaction_uuid: Option<String>,
        reason: String,
    },

    /// Network/HTTP error communicating with the gateway
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Gateway API error
    #[error("Gateway error [{gateway}]: {message}")]
    GatewayError { gateway: String, message: String },

    /// Data store failure
    #[error("Store error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::NetworkError(_) | CheckoutError::GatewayError { .. }
        )
    }

    /// Returns true if this is a payment verification failure.
    ///
    /// Verification failures are user-visible as a failure-page redirect,
    /// never as a 5xx response.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            CheckoutError::DecodeError(_)
                | CheckoutError::SignatureMismatch { .. }
                | CheckoutError::VerificationFailed { .. }
        )
    }

    /// Transaction the failing callback identified, if it decoded that far
    pub fn transaction_uuid(&self) -> Option<&str> {
        match self {
            CheckoutError::SignatureMismatch { transaction_uuid }
            | CheckoutError::VerificationFailed {
                transaction_uuid, ..
            } => transaction_uuid.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidRequest(_) => 400,
            // Unknown item ids arrive in the request body, so they surface
            // as a bad request rather than a routing 404.
            CheckoutError::ItemNotFound { .. } => 400,
            CheckoutError::PriceMismatch { .. } => 400,
            CheckoutError::PurchaseNotFound { .. } => 404,
            CheckoutError::UserExists { .. } => 400,
            CheckoutError::InvalidCredentials => 400,
            CheckoutError::DecodeError(_) => 400,
            CheckoutError::SignatureMismatch { .. } => 400,
            CheckoutError::VerificationFailed { .. } => 400,
            CheckoutError::NetworkError(_) => 503,
            CheckoutError::GatewayError { .. } => 502,
            CheckoutError::Storage(_) => 500,
            CheckoutError::Serialization(_) => 500,
            CheckoutError::Internal(_) => 500,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
