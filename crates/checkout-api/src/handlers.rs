//! # Request Handlers
//!
//! Axum request handlers for the checkout API: item creation, checkout
//! initiation, and the gateway completion callback.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use checkout_core::{CheckoutError, Item, Payment, PurchaseStatus, PurchasedItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create item request
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Initialize checkout request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeCheckoutRequest {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub total_price: Option<f64>,
}

/// Initialize checkout response
#[derive(Debug, Serialize)]
pub struct InitializeCheckoutResponse {
    pub success: bool,
    /// Signed form payload to POST to the gateway form URL
    pub payment: checkout_core::SignedCheckout,
    /// The pending purchase record
    pub purchased_item: PurchasedItem,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Minimal percent-escaping for redirect query values (our messages only
/// contain spaces beyond unreserved characters)
fn query_escape(value: &str) -> String {
    value.replace(' ', "%20")
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "esewa-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create an item (test/support endpoint)
#[instrument(skip(state, request))]
pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Item>), (StatusCode, Json<ErrorResponse>)> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let price = request.price.filter(|p| p.is_finite() && *p > 0.0);

    let (Some(name), Some(price)) = (name, price) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid product data", 400)),
        ));
    };

    let item = state.store.insert_item(Item::new(name, price));
    info!("Created item {} ({})", item.id, item.name);

    Ok((StatusCode::CREATED, Json(item)))
}

/// Initialize an eSewa checkout: create a pending purchase and return the
/// signed form payload for the gateway's hosted page
#[instrument(skip(state, request))]
pub async fn initialize_checkout(
    State(state): State<AppState>,
    Json(request): Json<InitializeCheckoutRequest>,
) -> Result<Json<InitializeCheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(item_id), Some(total_price)) = (request.item_id, request.total_price) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("itemId and totalPrice are required", 400)),
        ));
    };

    let item = state
        .store
        .get_item(&item_id)
        .map_err(checkout_error_to_response)?;

    // Price must match the stored item price; a stale or tampered quote
    // must not create a purchase.
    if !item.price_matches(total_price) {
        let err = CheckoutError::PriceMismatch {
            expected: item.price,
            received: total_price,
        };
        let code = err.status_code();
        return Err((
            StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST),
            Json(ErrorResponse::new("Price mismatch", code).with_details(err.to_string())),
        ));
    }

    let purchase = state
        .store
        .insert_purchase(PurchasedItem::new(&item, state.gateway.gateway_name()));

    let payment = state
        .gateway
        .initiate_checkout(&purchase)
        .map_err(checkout_error_to_response)?;

    info!(
        "Initialized checkout {} for item {} ({})",
        purchase.id, item.id, purchase.total_price
    );

    Ok(Json(InitializeCheckoutResponse {
        success: true,
        payment,
        purchased_item: purchase,
    }))
}

/// Gateway completion callback: verify the payment, persist the audit
/// record, flip the purchase to completed, and redirect to a result page.
///
/// Verification failures redirect to the failure page; they never surface
/// as a 5xx.
#[instrument(skip(state, params))]
pub async fn complete_payment(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(data) = params.get("data") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing payment data", 400)),
        )
            .into_response();
    };

    let verified = match state.gateway.verify_callback(data).await {
        Ok(verified) => verified,
        Err(err) => return verification_failure_response(&state, err),
    };

    let purchase = match state.store.get_purchase(&verified.transaction_uuid) {
        Ok(purchase) => purchase,
        Err(err) => return checkout_error_to_response(err).into_response(),
    };

    let callback_query = serde_json::to_value(&params).unwrap_or_default();
    let payment = Payment::verified(
        &verified.transaction_code,
        &purchase,
        state.gateway.gateway_name(),
        verified.status_response.clone(),
        callback_query,
    );

    if !state.store.record_payment(payment) {
        // Re-delivered callback; the audit record already exists.
        info!(
            "Payment {} already recorded for purchase {}",
            verified.transaction_code, purchase.id
        );
    }

    if let Err(err) = state.store.complete_purchase(&purchase.id) {
        return checkout_error_to_response(err).into_response();
    }

    info!(
        "Completed purchase {} via transaction {}",
        purchase.id, verified.transaction_code
    );

    let url = format!(
        "/payment/success?message={}&transactionId={}",
        query_escape("Payment successful!"),
        verified.transaction_code
    );
    Redirect::to(&url).into_response()
}

fn verification_failure_response(state: &AppState, err: CheckoutError) -> Response {
    warn!("Payment verification failed: {}", err);

    // A definitive rejection names the transaction it was for; finalize
    // that purchase as failed. Unknown uuids are ignored.
    if let Some(uuid) = err.transaction_uuid() {
        match state.store.fail_purchase(uuid) {
            Ok(purchase) if purchase.status == PurchaseStatus::Failed => {
                info!("Marked purchase {} as failed", uuid)
            }
            Ok(_) => {}
            Err(_) => warn!("Rejected callback for unknown purchase {}", uuid),
        }
    }

    if err.is_verification_failure() || err.is_retryable() {
        let url = format!(
            "/payment/failure?message={}",
            query_escape("Payment verification failed.")
        );
        Redirect::to(&url).into_response()
    } else {
        checkout_error_to_response(err).into_response()
    }
}

/// Payment success page
pub async fn payment_success(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let message = params.get("message").map(|s| s.as_str()).unwrap_or("");
    let transaction_id = params
        .get("transactionId")
        .map(|s| s.as_str())
        .unwrap_or("");
    Html(format!(
        r#"
<!DOCTYPE html>
<html>
<head><title>Payment Successful</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <div style="font-size: 60px;">✅</div>
        <h1>Payment Successful!</h1>
        <p>{}</p>
        <p>Transaction ID: <code>{}</code></p>
        <a href="/">Back to home</a>
    </div>
</body>
</html>
"#,
        message, transaction_id
    ))
}

/// Payment failure page
pub async fn payment_failure(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let message = params
        .get("message")
        .map(|s| s.as_str())
        .unwrap_or("There was an issue with your payment.");
    (
        StatusCode::BAD_REQUEST,
        Html(format!(
            r#"
<!DOCTYPE html>
<html>
<head><title>Payment Failed</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <div style="font-size: 60px;">❌</div>
        <h1>Payment Failed</h1>
        <p>{}</p>
        <a href="/">Back to home</a>
    </div>
</body>
</html>
"#,
            message
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert!(err.details.is_none());
    }

    #[test]
    fn test_checkout_error_conversion() {
        let err = CheckoutError::InvalidRequest("Bad data".to_string());
        let (status, _json) = checkout_error_to_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let err = CheckoutError::PurchaseNotFound {
            transaction_uuid: "x".into(),
        };
        let (status, _json) = checkout_error_to_response(err);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_query_escape() {
        assert_eq!(query_escape("Payment successful!"), "Payment%20successful!");
    }
}
