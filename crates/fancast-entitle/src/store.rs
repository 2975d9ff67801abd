use async_trait::async_trait;

use crate::errors::StoreError;
use crate::model::{Account, SubscriptionRecord, Tenant};
use fancast_types::prelude::{Id, TenantId};

/// The only mutable shared state in the system: chat-access checks read
/// it, the webhook reconciler writes it. Mutations are modeled as
/// per-record set/array operations that are commutative under concurrent
/// delivery; implementations must apply each one atomically rather than
/// read-modify-write. No operation spans more than one account and one
/// tenant record, and each side is individually idempotent.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn upsert_account(&self, account: Account) -> Result<(), StoreError>;
    async fn account(&self, id: &Id) -> Result<Option<Account>, StoreError>;

    async fn upsert_tenant(&self, tenant: Tenant) -> Result<(), StoreError>;
    async fn tenant(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError>;

    /// Set-union add of a paid subscription: the tenant joins the
    /// account's subscribed set and the record its active list, once each,
    /// no matter how often the same event is redelivered.
    async fn add_subscription(
        &self,
        account_id: &Id,
        record: SubscriptionRecord,
        billing_customer_id: Option<String>,
    ) -> Result<(), StoreError>;

    /// Removes the tenant from the subscribed set and its matching record
    /// from the active list. Succeeds as a no-op when either half is
    /// already gone, so redelivery is safe.
    async fn remove_subscription(
        &self,
        account_id: &Id,
        tenant: &TenantId,
    ) -> Result<(), StoreError>;

    /// Synchronous free-tier grant: subscribed-set union only, no billing
    /// record. Returns the updated account.
    async fn subscribe_free(&self, account_id: &Id, tenant: &TenantId)
        -> Result<Account, StoreError>;

    async fn set_onboarding(&self, tenant: &TenantId, complete: bool) -> Result<(), StoreError>;

    /// Sets price handle and amount together. Rejected while onboarding is
    /// incomplete: a price handle must never exist on an un-onboarded
    /// tenant.
    async fn set_price(
        &self,
        tenant: &TenantId,
        price_id: String,
        minor_units: u32,
    ) -> Result<(), StoreError>;

    /// Clears price handle and amount together.
    async fn clear_price(&self, tenant: &TenantId) -> Result<(), StoreError>;

    async fn set_retrieval_connection(
        &self,
        tenant: &TenantId,
        connection_id: String,
    ) -> Result<(), StoreError>;

    /// Whether the account may chat against the tenant: it owns the tenant
    /// or holds a subscription (free or paid).
    async fn has_access(&self, account_id: &Id, tenant: &TenantId) -> Result<bool, StoreError>;
}
