use std::sync::Arc;

use tracing::{info, warn};

use crate::event::BillingEvent;
use fancast_entitle::prelude::{EntitlementStore, StoreError, SubscriptionRecord};
use fancast_types::prelude::{Id, TenantId};

/// How an acknowledged event was handled. `Skipped` covers events the
/// processor formed without the metadata we stamp at checkout; they are
/// acknowledged (redelivery would never help) but surfaced to logs and
/// counters rather than dropped silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied,
    Skipped,
    Ignored,
}

/// Folds asynchronous processor events into the entitlement store.
///
/// Every branch is idempotent under redelivery. A [`StoreError`] escaping
/// here is the one outcome the webhook endpoint reports as retryable.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn EntitlementStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    pub async fn apply(&self, event: BillingEvent) -> Result<ReconcileOutcome, StoreError> {
        match event {
            BillingEvent::CheckoutCompleted(session) => {
                let (Some(user_id), Some(org_id)) = (
                    session.metadata.user_id.clone(),
                    session.metadata.org_id.clone(),
                ) else {
                    warn!("checkout completed without userId/orgId metadata, skipping");
                    return Ok(ReconcileOutcome::Skipped);
                };

                let record = SubscriptionRecord {
                    tenant_id: TenantId(org_id.clone()),
                    billing_subscription_id: session.subscription.unwrap_or_default(),
                    connected_account_id: session
                        .metadata
                        .connected_account_id
                        .unwrap_or_default(),
                };
                self.store
                    .add_subscription(&Id(user_id.clone()), record, session.customer)
                    .await?;
                info!(account = %user_id, tenant = %org_id, "subscription activated");
                Ok(ReconcileOutcome::Applied)
            }
            BillingEvent::SubscriptionDeleted(subscription) => {
                let (Some(user_id), Some(org_id)) = (
                    subscription.metadata.user_id,
                    subscription.metadata.org_id,
                ) else {
                    warn!("subscription deleted without userId/orgId metadata, skipping");
                    return Ok(ReconcileOutcome::Skipped);
                };

                self.store
                    .remove_subscription(&Id(user_id.clone()), &TenantId(org_id.clone()))
                    .await?;
                info!(account = %user_id, tenant = %org_id, "subscription deactivated");
                Ok(ReconcileOutcome::Applied)
            }
            BillingEvent::AccountUpdated(account) => {
                let Some(org_id) = account.metadata.org_id else {
                    warn!("account updated without orgId metadata, skipping");
                    return Ok(ReconcileOutcome::Skipped);
                };

                let complete = account.charges_enabled && account.details_submitted;
                self.store
                    .set_onboarding(&TenantId(org_id.clone()), complete)
                    .await?;
                info!(tenant = %org_id, complete, "billing onboarding reflected");
                Ok(ReconcileOutcome::Applied)
            }
            BillingEvent::Unknown { event_type } => {
                info!(event_type, "unhandled billing event type");
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }
}
