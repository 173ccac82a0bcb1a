//! # Payment Verification
//!
//! Verifies eSewa completion callbacks. A callback arrives as a
//! base64-encoded JSON document; verification decodes it, recomputes the
//! signature over the gateway-specified fields, then confirms the
//! transaction against the gateway's status endpoint. Only a callback
//! that passes all three gates may complete a purchase.

use crate::config::EsewaConfig;
use crate::signature::{constant_time_compare, sign_message};
use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE as BASE64_URL};
use base64::Engine;
use checkout_core::{amounts_equal, CheckoutError, CheckoutResult, VerifiedPayment};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Remote status a settled transaction must report
const STATUS_COMPLETE: &str = "COMPLETE";

/// Typed view of the callback payload
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPayload {
    pub transaction_code: String,
    pub status: String,
    #[serde(deserialize_with = "de_string_or_number")]
    pub total_amount: String,
    pub transaction_uuid: String,
    #[serde(default)]
    pub product_code: Option<String>,
    pub signed_field_names: String,
    pub signature: String,
}

/// Payload returned by the transaction-status endpoint
#[derive(Debug, Clone, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    transaction_uuid: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    total_amount: Option<f64>,
}

/// Decode and parse a base64-encoded callback document.
///
/// The payload travels in a query parameter, so both standard and
/// URL-safe base64 alphabets are accepted.
pub fn decode_callback(encoded_data: &str) -> CheckoutResult<(CallbackPayload, Value)> {
    let bytes = BASE64
        .decode(encoded_data)
        .or_else(|_| BASE64_URL.decode(encoded_data))
        .map_err(|e| CheckoutError::DecodeError(format!("invalid base64: {}", e)))?;

    let raw: Value = serde_json::from_slice(&bytes)
        .map_err(|e| CheckoutError::DecodeError(format!("invalid JSON payload: {}", e)))?;

    let payload: CallbackPayload = serde_json::from_value(raw.clone())
        .map_err(|e| CheckoutError::DecodeError(format!("malformed callback: {}", e)))?;

    Ok((payload, raw))
}

/// Full verification: decode, signature check, remote status check.
pub async fn verify_payment(
    config: &EsewaConfig,
    client: &Client,
    encoded_data: &str,
) -> CheckoutResult<VerifiedPayment> {
    let (payload, raw) = decode_callback(encoded_data)?;
    let transaction_uuid = payload.transaction_uuid.clone();

    // Gate 1: the callback signature must recompute with our secret.
    let message = callback_message(config, &payload, &raw)?;
    let expected = sign_message(&config.secret_key, &message);
    if !constant_time_compare(&expected, &payload.signature) {
        warn!("Callback signature mismatch for {}", transaction_uuid);
        return Err(CheckoutError::SignatureMismatch {
            transaction_uuid: Some(transaction_uuid),
        });
    }

    let local_amount: f64 = payload.total_amount.parse().map_err(|_| {
        CheckoutError::VerificationFailed {
            transaction_uuid: Some(transaction_uuid.clone()),
            reason: format!("unparseable callback amount {:?}", payload.total_amount),
        }
    })?;

    // Gate 2: the gateway itself must confirm the transaction.
    let response = client
        .get(config.status_url())
        .header(reqwest::header::ACCEPT, "application/json")
        .query(&[
            ("product_code", config.product_code.as_str()),
            ("total_amount", payload.total_amount.as_str()),
            ("transaction_uuid", transaction_uuid.as_str()),
        ])
        .send()
        .await
        .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

    let http_status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

    if !http_status.is_success() {
        return Err(CheckoutError::GatewayError {
            gateway: "esewa".to_string(),
            message: format!("status endpoint returned HTTP {}: {}", http_status, body),
        });
    }

    let status_raw: Value = serde_json::from_str(&body).map_err(|e| CheckoutError::GatewayError {
        gateway: "esewa".to_string(),
        message: format!("unparseable status response: {}", e),
    })?;
    let status: StatusResponse =
        serde_json::from_value(status_raw.clone()).map_err(|e| CheckoutError::GatewayError {
            gateway: "esewa".to_string(),
            message: format!("unexpected status response shape: {}", e),
        })?;

    let remote_status = status.status.unwrap_or_default();
    let remote_uuid = status.transaction_uuid.unwrap_or_default();
    let remote_amount = status.total_amount;

    let reject = |reason: String| CheckoutError::VerificationFailed {
        transaction_uuid: Some(transaction_uuid.clone()),
        reason,
    };

    if remote_status != STATUS_COMPLETE {
        return Err(reject(format!("gateway reports status {:?}", remote_status)));
    }
    if remote_uuid != transaction_uuid {
        return Err(reject(format!(
            "gateway transaction {:?} does not match {:?}",
            remote_uuid, transaction_uuid
        )));
    }
    let remote_amount = match remote_amount {
        Some(amount) if amounts_equal(amount, local_amount) => amount,
        other => {
            return Err(reject(format!(
                "gateway amount {:?} does not match {}",
                other, local_amount
            )));
        }
    };

    debug!("Verified payment {} ({})", payload.transaction_code, transaction_uuid);

    Ok(VerifiedPayment {
        transaction_code: payload.transaction_code,
        transaction_uuid,
        total_amount: remote_amount,
        status: remote_status,
        status_response: status_raw,
        callback: raw,
    })
}

/// Rebuild the signed message from the callback's own `signed_field_names`.
///
/// Values come from the callback document, except `product_code`, which is
/// always the locally configured merchant code.
fn callback_message(
    config: &EsewaConfig,
    payload: &CallbackPayload,
    raw: &Value,
) -> CheckoutResult<String> {
    let fields = raw.as_object().ok_or_else(|| {
        CheckoutError::DecodeError("callback payload is not a JSON object".to_string())
    })?;

    let mut parts = Vec::new();
    for name in payload.signed_field_names.split(',') {
        let value = if name == "product_code" {
            config.product_code.clone()
        } else {
            match fields.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(CheckoutError::DecodeError(format!(
                        "callback missing signed field {:?}",
                        name
                    )));
                }
            }
        };
        parts.push(format!("{}={}", name, value));
    }
    Ok(parts.join(","))
}

fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "8gBm/:&EnhH.1/q";

    fn config_for(server_url: &str) -> EsewaConfig {
        EsewaConfig::new(SECRET, "EPAYTEST", server_url)
    }

    /// Build an encoded callback the way the gateway would sign it
    fn encoded_callback(transaction_uuid: &str, total_amount: &str, secret: &str) -> String {
        let signed_field_names =
            "transaction_code,status,total_amount,transaction_uuid,product_code,signed_field_names";
        let message = format!(
            "transaction_code=000AXN5,status=COMPLETE,total_amount={},transaction_uuid={},product_code=EPAYTEST,signed_field_names={}",
            total_amount, transaction_uuid, signed_field_names
        );
        let signature = sign_message(secret, &message);

        let payload = json!({
            "transaction_code": "000AXN5",
            "status": "COMPLETE",
            "total_amount": total_amount,
            "transaction_uuid": transaction_uuid,
            "product_code": "EPAYTEST",
            "signed_field_names": signed_field_names,
            "signature": signature,
        });
        BASE64.encode(payload.to_string())
    }

    fn status_mock(uuid: &str, amount: f64, status: &str) -> Mock {
        Mock::given(method("GET"))
            .and(path("/api/epay/transaction/status/"))
            .and(query_param("product_code", "EPAYTEST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "product_code": "EPAYTEST",
                "transaction_uuid": uuid,
                "total_amount": amount,
                "status": status,
                "ref_id": "REF123",
            })))
    }

    #[tokio::test]
    async fn test_verify_accepts_complete_transaction() {
        let server = MockServer::start().await;
        status_mock("uuid-1", 100.0, "COMPLETE").mount(&server).await;

        let config = config_for(&server.uri());
        let client = Client::new();
        let encoded = encoded_callback("uuid-1", "100", SECRET);

        let verified = verify_payment(&config, &client, &encoded).await.unwrap();
        assert_eq!(verified.transaction_code, "000AXN5");
        assert_eq!(verified.transaction_uuid, "uuid-1");
        assert_eq!(verified.total_amount, 100.0);
        assert_eq!(verified.status, "COMPLETE");
        assert_eq!(verified.callback["transaction_uuid"], "uuid-1");
    }

    #[tokio::test]
    async fn test_verify_rejects_tampered_signature() {
        let server = MockServer::start().await;
        // remote check must never run on a bad signature
        status_mock("uuid-1", 100.0, "COMPLETE")
            .expect(0)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let client = Client::new();
        // signed with the wrong secret
        let encoded = encoded_callback("uuid-1", "100", "wrong-secret");

        let err = verify_payment(&config, &client, &encoded).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::SignatureMismatch {
                transaction_uuid: Some(ref uuid)
            } if uuid == "uuid-1"
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_amount_tampering() {
        let server = MockServer::start().await;
        let config = config_for(&server.uri());
        let client = Client::new();

        // sign for 100, then claim 200
        let signed_field_names =
            "transaction_code,status,total_amount,transaction_uuid,product_code,signed_field_names";
        let message = format!(
            "transaction_code=000AXN5,status=COMPLETE,total_amount=100,transaction_uuid=uuid-1,product_code=EPAYTEST,signed_field_names={}",
            signed_field_names
        );
        let payload = json!({
            "transaction_code": "000AXN5",
            "status": "COMPLETE",
            "total_amount": "200",
            "transaction_uuid": "uuid-1",
            "product_code": "EPAYTEST",
            "signed_field_names": signed_field_names,
            "signature": sign_message(SECRET, &message),
        });
        let encoded = BASE64.encode(payload.to_string());

        let err = verify_payment(&config, &client, &encoded).await.unwrap_err();
        assert!(matches!(err, CheckoutError::SignatureMismatch { .. }));
    }

    #[tokio::test]
    async fn test_verify_rejects_incomplete_remote_status() {
        let server = MockServer::start().await;
        status_mock("uuid-1", 100.0, "PENDING").mount(&server).await;

        let config = config_for(&server.uri());
        let client = Client::new();
        let encoded = encoded_callback("uuid-1", "100", SECRET);

        let err = verify_payment(&config, &client, &encoded).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::VerificationFailed {
                transaction_uuid: Some(ref uuid),
                ..
            } if uuid == "uuid-1"
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_remote_uuid_mismatch() {
        let server = MockServer::start().await;
        status_mock("other-uuid", 100.0, "COMPLETE").mount(&server).await;

        let config = config_for(&server.uri());
        let client = Client::new();
        let encoded = encoded_callback("uuid-1", "100", SECRET);

        let err = verify_payment(&config, &client, &encoded).await.unwrap_err();
        assert!(matches!(err, CheckoutError::VerificationFailed { .. }));
    }

    #[tokio::test]
    async fn test_verify_rejects_remote_amount_mismatch() {
        let server = MockServer::start().await;
        status_mock("uuid-1", 99.0, "COMPLETE").mount(&server).await;

        let config = config_for(&server.uri());
        let client = Client::new();
        let encoded = encoded_callback("uuid-1", "100", SECRET);

        let err = verify_payment(&config, &client, &encoded).await.unwrap_err();
        assert!(matches!(err, CheckoutError::VerificationFailed { .. }));
    }

    #[tokio::test]
    async fn test_verify_tolerates_remote_amount_noise() {
        let server = MockServer::start().await;
        status_mock("uuid-1", 100.005, "COMPLETE").mount(&server).await;

        let config = config_for(&server.uri());
        let client = Client::new();
        let encoded = encoded_callback("uuid-1", "100", SECRET);

        assert!(verify_payment(&config, &client, &encoded).await.is_ok());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_callback("not-base64!!!").unwrap_err();
        assert!(matches!(err, CheckoutError::DecodeError(_)));

        let err = decode_callback(&BASE64.encode("not json")).unwrap_err();
        assert!(matches!(err, CheckoutError::DecodeError(_)));
    }

    #[test]
    fn test_decode_accepts_numeric_total_amount() {
        let payload = json!({
            "transaction_code": "000AXN5",
            "status": "COMPLETE",
            "total_amount": 100,
            "transaction_uuid": "uuid-1",
            "signed_field_names": "total_amount",
            "signature": "sig",
        });
        let (decoded, _) = decode_callback(&BASE64.encode(payload.to_string())).unwrap();
        assert_eq!(decoded.total_amount, "100");
    }
}
