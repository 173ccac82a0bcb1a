//! # Payment Signatures
//!
//! HMAC-SHA256 signing for eSewa ePay v2 payloads.
//!
//! The gateway signs a comma-joined `name=value` string of the fields
//! listed in `signed_field_names`, in that exact order, and encodes the
//! MAC as base64.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fields covered by the checkout-form signature, in signing order
pub const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// Render a monetary amount the way it appears in signed messages.
///
/// Whole amounts render without a decimal point (100 -> "100"),
/// fractional ones keep their shortest representation (100.5 -> "100.5"),
/// matching what the gateway signs.
pub fn format_amount(amount: f64) -> String {
    amount.to_string()
}

/// Canonical message for the checkout-form signature
pub fn checkout_message(total_amount: &str, transaction_uuid: &str, product_code: &str) -> String {
    format!(
        "total_amount={},transaction_uuid={},product_code={}",
        total_amount, transaction_uuid, product_code
    )
}

/// base64(HMAC-SHA256(secret, message))
pub fn sign_message(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison for signature checks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
