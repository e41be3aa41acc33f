use crate::config::StripeConfig;
use crate::error::app_error::AppError;
use crate::models::payment::{PaymentIntent, PaymentIntentMetadata, StripeEvent};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Reject webhook events whose signature timestamp is older than this,
/// to bound replay of captured deliveries.
const WEBHOOK_TOLERANCE_SECONDS: i64 = 300;

/// Thin client for the Stripe REST API. Only the two calls this service
/// needs are wrapped; everything else stays on the provider side.
pub struct StripeClient {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a provider-side payment intent for `amount_minor` minor
    /// currency units, tagged with the rental/product/user ids so webhook
    /// events can be routed back without any local lookup state.
    pub async fn create_payment_intent(&self, amount_minor: i64, metadata: &PaymentIntentMetadata) -> Result<PaymentIntent, AppError> {
        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", self.config.currency.clone()),
            ("metadata[rental_id]", metadata.rental_id.to_string()),
            ("metadata[product_id]", metadata.product_id.to_string()),
            ("metadata[user_id]", metadata.user_id.to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.config.api_base))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "payment intent creation failed");
            return Err(AppError::upstream(format!("Provider returned {}", status)));
        }

        Ok(response.json::<PaymentIntent>().await?)
    }

    /// Verify the `Stripe-Signature` header and parse the event payload.
    pub fn construct_event(&self, payload: &str, signature_header: &str) -> Result<StripeEvent, AppError> {
        verify_webhook_signature(payload, signature_header, &self.config.webhook_secret, chrono::Utc::now().timestamp())?;
        serde_json::from_str(payload).map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {}", e)))
    }
}

/// Parse a `Stripe-Signature` header of the form
/// `t=<unix-seconds>,v1=<hex>,v1=<hex>,...` into its timestamp and the
/// candidate signatures.
pub(crate) fn parse_signature_header(header: &str) -> Option<(i64, Vec<&str>)> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => signatures.push(value),
            // Unknown schemes (v0, test markers) are ignored.
            _ => {}
        }
    }

    match (timestamp, signatures.is_empty()) {
        (Some(t), false) => Some((t, signatures)),
        _ => None,
    }
}

/// Check an event signature: HMAC-SHA256 over `"{timestamp}.{payload}"`
/// keyed with the webhook signing secret, compared in constant time
/// against each `v1` candidate, with a replay-bounding timestamp check.
pub fn verify_webhook_signature(payload: &str, signature_header: &str, secret: &str, now: i64) -> Result<(), AppError> {
    let Some((timestamp, signatures)) = parse_signature_header(signature_header) else {
        return Err(AppError::BadRequest("Malformed webhook signature header".to_string()));
    };

    if (now - timestamp).abs() > WEBHOOK_TOLERANCE_SECONDS {
        return Err(AppError::BadRequest("Webhook timestamp outside tolerance".to_string()));
    }

    let signed_payload = format!("{}.{}", timestamp, payload);

    for candidate in signatures {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AppError::BadRequest("Invalid webhook secret".to_string()))?;
        mac.update(signed_payload.as_bytes());
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::BadRequest("Webhook signature verification failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &str, timestamp: i64, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign(payload, now, "whsec_test"));

        assert!(verify_webhook_signature(payload, &header, "whsec_test", now).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign(r#"{"amount":100}"#, now, "whsec_test"));

        assert!(verify_webhook_signature(r#"{"amount":999}"#, &header, "whsec_test", now).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = "{}";
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign(payload, now, "whsec_a"));

        assert!(verify_webhook_signature(payload, &header, "whsec_b", now).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = "{}";
        let sent_at = 1_700_000_000;
        let header = format!("t={},v1={}", sent_at, sign(payload, sent_at, "whsec_test"));

        let now = sent_at + WEBHOOK_TOLERANCE_SECONDS + 1;
        assert!(verify_webhook_signature(payload, &header, "whsec_test", now).is_err());
    }

    #[test]
    fn second_v1_candidate_is_accepted() {
        // Stripe sends multiple v1 entries during secret rotation.
        let payload = "{}";
        let now = 1_700_000_000;
        let good = sign(payload, now, "whsec_test");
        let header = format!("t={},v1={},v1={}", now, "00".repeat(32), good);

        assert!(verify_webhook_signature(payload, &header, "whsec_test", now).is_ok());
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert!(parse_signature_header("v1=abc").is_none());
        assert!(parse_signature_header("t=123").is_none());
        assert!(parse_signature_header("garbage").is_none());
        assert!(verify_webhook_signature("{}", "garbage", "whsec_test", 0).is_err());
    }
}
