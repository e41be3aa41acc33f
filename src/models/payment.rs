use crate::models::rental::PaymentStatus;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Debug, JsonSchema)]
pub struct CreatePaymentIntentRequest {
    pub rental_id: Uuid,
}

/// The provider-side confirmation secret handed to the client so it can
/// complete the card flow against Stripe directly.
#[derive(Serialize, Debug, JsonSchema)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct UpdatePaymentStatusRequest {
    pub rental_id: Uuid,
    #[validate(length(min = 1))]
    pub payment_id: String,
    pub payment_status: PaymentStatus,
}

/// Subset of Stripe's PaymentIntent object this service reads.
#[derive(Deserialize, Debug)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Opaque metadata attached to every intent, echoed back in webhook events.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentIntentMetadata {
    pub rental_id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Deserialize, Debug)]
pub struct StripeEventData {
    pub object: StripeEventObject,
}

#[derive(Deserialize, Debug)]
pub struct StripeEventObject {
    pub id: String,
    pub metadata: PaymentIntentMetadata,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct WebhookAck {
    pub received: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_event_deserializes_metadata_ids() {
        let rental_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let payload = serde_json::json!({
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_123",
                    "amount": 30000,
                    "metadata": {
                        "rental_id": rental_id,
                        "product_id": product_id,
                        "user_id": user_id
                    }
                }
            }
        });

        let event: StripeEvent = serde_json::from_value(payload).expect("event parses");
        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.data.object.id, "pi_123");
        assert_eq!(event.data.object.metadata.rental_id, rental_id);
        assert_eq!(event.data.object.metadata.product_id, product_id);
    }
}
