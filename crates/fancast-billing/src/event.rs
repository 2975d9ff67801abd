use serde::Deserialize;

use crate::errors::BillingError;

/// The lifecycle events this system reacts to, dispatched on the
/// processor's `type` tag. The union is closed on our side: a tag we do
/// not know becomes [`BillingEvent::Unknown`] and is acknowledged as a
/// no-op, so processor-side additions never turn into delivery failures.
#[derive(Clone, Debug, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted(CheckoutSession),
    SubscriptionDeleted(SubscriptionObject),
    AccountUpdated(AccountObject),
    Unknown { event_type: String },
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EventMetadata {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    #[serde(rename = "connectedAccountId", default)]
    pub connected_account_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CheckoutSession {
    #[serde(default)]
    pub metadata: EventMetadata,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SubscriptionObject {
    #[serde(default)]
    pub metadata: EventMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AccountObject {
    #[serde(default)]
    pub metadata: EventMetadata,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub details_submitted: bool,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: EnvelopeData,
}

#[derive(Deserialize, Default)]
struct EnvelopeData {
    #[serde(default)]
    object: serde_json::Value,
}

impl BillingEvent {
    /// Parses a verified webhook body. The envelope must be well-formed
    /// JSON with a `type` tag; a known tag whose object fails to decode is
    /// malformed, an unknown tag is not.
    pub fn parse(payload: &[u8]) -> Result<Self, BillingError> {
        let envelope: Envelope = serde_json::from_slice(payload)
            .map_err(|err| BillingError::schema(&format!("envelope decode: {err}")))?;

        let object = envelope.data.object;
        match envelope.event_type.as_str() {
            "checkout.session.completed" => {
                let session = serde_json::from_value(object).map_err(|err| {
                    BillingError::schema(&format!("checkout session decode: {err}"))
                })?;
                Ok(BillingEvent::CheckoutCompleted(session))
            }
            "customer.subscription.deleted" => {
                let subscription = serde_json::from_value(object)
                    .map_err(|err| BillingError::schema(&format!("subscription decode: {err}")))?;
                Ok(BillingEvent::SubscriptionDeleted(subscription))
            }
            "account.updated" => {
                let account = serde_json::from_value(object)
                    .map_err(|err| BillingError::schema(&format!("account decode: {err}")))?;
                Ok(BillingEvent::AccountUpdated(account))
            }
            _ => Ok(BillingEvent::Unknown {
                event_type: envelope.event_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_checkout_completed() {
        let payload = json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "metadata": { "userId": "fan-1", "orgId": "creator-1" },
                "customer": "cus_9",
                "subscription": "sub_9"
            }}
        });
        let event = BillingEvent::parse(payload.to_string().as_bytes()).unwrap();
        let BillingEvent::CheckoutCompleted(session) = event else {
            panic!("wrong variant");
        };
        assert_eq!(session.metadata.user_id.as_deref(), Some("fan-1"));
        assert_eq!(session.metadata.org_id.as_deref(), Some("creator-1"));
        assert_eq!(session.customer.as_deref(), Some("cus_9"));
        assert_eq!(session.subscription.as_deref(), Some("sub_9"));
    }

    #[test]
    fn parses_account_updated_capability_flags() {
        let payload = json!({
            "type": "account.updated",
            "data": { "object": {
                "metadata": { "orgId": "creator-2" },
                "charges_enabled": true,
                "details_submitted": false
            }}
        });
        let event = BillingEvent::parse(payload.to_string().as_bytes()).unwrap();
        let BillingEvent::AccountUpdated(account) = event else {
            panic!("wrong variant");
        };
        assert!(account.charges_enabled);
        assert!(!account.details_submitted);
    }

    #[test]
    fn unknown_tags_are_tolerated() {
        let payload = json!({ "type": "invoice.paid", "data": { "object": {} } });
        let event = BillingEvent::parse(payload.to_string().as_bytes()).unwrap();
        assert_eq!(
            event,
            BillingEvent::Unknown {
                event_type: "invoice.paid".into()
            }
        );
    }

    #[test]
    fn missing_metadata_defaults_to_empty() {
        let payload = json!({
            "type": "customer.subscription.deleted",
            "data": { "object": {} }
        });
        let event = BillingEvent::parse(payload.to_string().as_bytes()).unwrap();
        let BillingEvent::SubscriptionDeleted(subscription) = event else {
            panic!("wrong variant");
        };
        assert_eq!(subscription.metadata, EventMetadata::default());
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        assert!(BillingEvent::parse(b"not json").is_err());
        assert!(BillingEvent::parse(br#"{"data":{}}"#).is_err());
    }
}
