use crate::error::{CheckoutError, Result, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path of the charge endpoint for an order. The identifier is
/// percent-encoded so it always stays one path segment.
pub fn charge_path(order_identifier: &str) -> String {
    format!("orders/{}/charge", urlencoding::encode(order_identifier))
}

/// Path of the AliPay source-creation endpoint for an order.
pub fn create_source_path(order_identifier: &str) -> String {
    format!("create_source/{}", urlencoding::encode(order_identifier))
}

/// Token emitted by the card-entry widget once the card has been accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardToken {
    pub id: String,
}

/// Payer and payment identifiers returned by the PayPal approval flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaypalApproval {
    pub payer_id: String,
    pub payment_id: String,
}

/// Provider fields submitted to `POST orders/{identifier}/charge`.
///
/// Exactly one provider is populated; the others are sent as explicit `null`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    pub stripe: Option<String>,
    pub paypal_payer_id: Option<String>,
    pub paypal_payment_id: Option<String>,
}

#[derive(Serialize)]
struct ChargeEnvelope<'a> {
    data: ChargeData<'a>,
}

#[derive(Serialize)]
struct ChargeData<'a> {
    attributes: &'a ChargeRequest,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl ChargeRequest {
    pub fn stripe(token: CardToken) -> Self {
        Self {
            stripe: Some(token.id),
            ..Default::default()
        }
    }

    pub fn paypal(approval: PaypalApproval) -> Self {
        Self {
            stripe: None,
            paypal_payer_id: Some(approval.payer_id),
            paypal_payment_id: Some(approval.payment_id),
        }
    }

    /// Renders the JSON:API body as a literal string. The transport must send
    /// it untouched.
    pub fn to_body(&self) -> Result<String> {
        let envelope = ChargeEnvelope {
            data: ChargeData {
                attributes: self,
                kind: "charge",
            },
        };
        serde_json::to_string(&envelope).map_err(|e| {
            CheckoutError::ValidationError(format!("Unable to encode charge request: {}", e))
        })
    }
}

/// Verdict of the remote charge. The only source of truth for whether money
/// moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeResult {
    pub succeeded: bool,
    pub message: String,
}

#[derive(Deserialize)]
struct ChargeResponseEnvelope {
    data: ChargeResponseData,
}

#[derive(Deserialize)]
struct ChargeResponseData {
    attributes: ChargeResponseAttributes,
}

#[derive(Deserialize)]
struct ChargeResponseAttributes {
    status: bool,
    #[serde(default)]
    message: Option<String>,
}

impl ChargeResult {
    pub fn new(succeeded: bool, message: impl Into<String>) -> Self {
        Self {
            succeeded,
            message: message.into(),
        }
    }

    /// Reads `data.attributes.{status,message}` from a charge response.
    ///
    /// A response without a boolean `status` is a transport fault, never a
    /// rejection. When `message` is absent the matching fallback is used.
    pub fn from_charge_response(
        body: Value,
        success_fallback: &str,
        failure_fallback: &str,
    ) -> std::result::Result<Self, TransportError> {
        let envelope: ChargeResponseEnvelope = serde_json::from_value(body)
            .map_err(|e| TransportError::Decode(format!("charge response: {}", e)))?;
        let attributes = envelope.data.attributes;
        let message = attributes.message.unwrap_or_else(|| {
            if attributes.status {
                success_fallback.to_string()
            } else {
                failure_fallback.to_string()
            }
        });
        Ok(Self::new(attributes.status, message))
    }
}

/// Response of `POST create_source/{identifier}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SourceResponse {
    pub status: bool,
}

impl SourceResponse {
    pub fn from_value(body: Value) -> std::result::Result<Self, TransportError> {
        serde_json::from_value(body)
            .map_err(|e| TransportError::Decode(format!("create-source response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths_keep_identifier_in_one_segment() {
        assert_eq!(charge_path("ord-1"), "orders/ord-1/charge");
        assert_eq!(charge_path("ord#7"), "orders/ord%237/charge");
        assert_eq!(charge_path("a/b?c"), "orders/a%2Fb%3Fc/charge");
        assert_eq!(create_source_path("ord#7"), "create_source/ord%237");
    }

    #[test]
    fn test_stripe_charge_body() {
        let request = ChargeRequest::stripe(CardToken {
            id: "tok_123".into(),
        });
        let body: Value = serde_json::from_str(&request.to_body().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "data": {
                    "attributes": {
                        "stripe": "tok_123",
                        "paypal_payer_id": null,
                        "paypal_payment_id": null
                    },
                    "type": "charge"
                }
            })
        );
    }

    #[test]
    fn test_paypal_charge_body_nulls_stripe() {
        let request = ChargeRequest::paypal(PaypalApproval {
            payer_id: "PAYER".into(),
            payment_id: "PAY-1".into(),
        });
        let body: Value = serde_json::from_str(&request.to_body().unwrap()).unwrap();
        assert_eq!(body["data"]["attributes"]["stripe"], Value::Null);
        assert_eq!(body["data"]["attributes"]["paypal_payer_id"], "PAYER");
        assert_eq!(body["data"]["attributes"]["paypal_payment_id"], "PAY-1");
        assert_eq!(body["data"]["type"], "charge");
    }

    #[test]
    fn test_charge_response_parsing() {
        let result = ChargeResult::from_charge_response(
            json!({"data": {"attributes": {"status": false, "message": "Card declined"}}}),
            "ok",
            "failed",
        )
        .unwrap();
        assert_eq!(result, ChargeResult::new(false, "Card declined"));
    }

    #[test]
    fn test_charge_response_message_fallback() {
        let result = ChargeResult::from_charge_response(
            json!({"data": {"attributes": {"status": true}}}),
            "Payment has succeeded",
            "Payment has failed",
        )
        .unwrap();
        assert_eq!(result, ChargeResult::new(true, "Payment has succeeded"));
    }

    #[test]
    fn test_charge_response_without_status_is_decode_error() {
        let err = ChargeResult::from_charge_response(
            json!({"data": {"attributes": {"message": "?"}}}),
            "ok",
            "failed",
        )
        .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));

        let err = ChargeResult::from_charge_response(json!({"errors": []}), "ok", "failed")
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn test_source_response() {
        assert!(SourceResponse::from_value(json!({"status": true})).unwrap().status);
        assert!(SourceResponse::from_value(json!({})).is_err());
    }
}
