pub use crate::errors::BillingError;
pub use crate::event::{
    AccountObject, BillingEvent, CheckoutSession, EventMetadata, SubscriptionObject,
};
pub use crate::reconcile::{ReconcileOutcome, Reconciler};
pub use crate::signature::{sign_payload, verify_signature};
