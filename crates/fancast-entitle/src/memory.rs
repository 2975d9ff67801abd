use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::errors::StoreError;
use crate::model::{Account, SubscriptionRecord, Tenant};
use crate::store::EntitlementStore;
use fancast_types::prelude::{Id, TenantId};

/// In-memory entitlement store. Every mutation runs inside one lock
/// acquisition, so the subscribed-tenant set and the active-subscription
/// list can never fall out of sync under concurrent webhook delivery.
#[derive(Clone, Default)]
pub struct MemoryEntitlementStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    tenants: HashMap<String, Tenant>,
}

impl MemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntitlementStore for MemoryEntitlementStore {
    async fn upsert_account(&self, account: Account) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.accounts.insert(account.id.0.clone(), account);
        Ok(())
    }

    async fn account(&self, id: &Id) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.lock().accounts.get(&id.0).cloned())
    }

    async fn upsert_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.tenants.insert(tenant.id.0.clone(), tenant);
        Ok(())
    }

    async fn tenant(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self.inner.lock().tenants.get(&id.0).cloned())
    }

    async fn add_subscription(
        &self,
        account_id: &Id,
        record: SubscriptionRecord,
        billing_customer_id: Option<String>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let account = inner
            .accounts
            .get_mut(&account_id.0)
            .ok_or_else(|| StoreError::not_found(&format!("account {account_id} missing")))?;

        if !account.subscribed_tenants.contains(&record.tenant_id) {
            account.subscribed_tenants.push(record.tenant_id.clone());
        }
        if !account
            .active_subscriptions
            .iter()
            .any(|s| s.tenant_id == record.tenant_id)
        {
            account.active_subscriptions.push(record);
        }
        if let Some(customer_id) = billing_customer_id {
            account.billing_customer_id = Some(customer_id);
        }
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn remove_subscription(
        &self,
        account_id: &Id,
        tenant: &TenantId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        // Absent account or absent entries are a successful no-op: the
        // processor may redeliver a deletion long after the state is gone.
        if let Some(account) = inner.accounts.get_mut(&account_id.0) {
            account.subscribed_tenants.retain(|t| t != tenant);
            account.active_subscriptions.retain(|s| &s.tenant_id != tenant);
            account.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn subscribe_free(
        &self,
        account_id: &Id,
        tenant: &TenantId,
    ) -> Result<Account, StoreError> {
        let mut inner = self.inner.lock();
        let account = inner
            .accounts
            .get_mut(&account_id.0)
            .ok_or_else(|| StoreError::not_found(&format!("account {account_id} missing")))?;
        if !account.subscribed_tenants.contains(tenant) {
            account.subscribed_tenants.push(tenant.clone());
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_onboarding(&self, tenant: &TenantId, complete: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let record = inner
            .tenants
            .get_mut(&tenant.0)
            .ok_or_else(|| StoreError::not_found(&format!("tenant {tenant} missing")))?;
        record.billing_onboarding_complete = complete;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn set_price(
        &self,
        tenant: &TenantId,
        price_id: String,
        minor_units: u32,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let record = inner
            .tenants
            .get_mut(&tenant.0)
            .ok_or_else(|| StoreError::not_found(&format!("tenant {tenant} missing")))?;
        if !record.billing_onboarding_complete {
            return Err(StoreError::precondition(&format!(
                "tenant {tenant} has not completed billing onboarding"
            )));
        }
        record.price_id = Some(price_id);
        record.price_minor_units = Some(minor_units);
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_price(&self, tenant: &TenantId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let record = inner
            .tenants
            .get_mut(&tenant.0)
            .ok_or_else(|| StoreError::not_found(&format!("tenant {tenant} missing")))?;
        record.price_id = None;
        record.price_minor_units = None;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn set_retrieval_connection(
        &self,
        tenant: &TenantId,
        connection_id: String,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let record = inner
            .tenants
            .get_mut(&tenant.0)
            .ok_or_else(|| StoreError::not_found(&format!("tenant {tenant} missing")))?;
        record.retrieval_connection_id = Some(connection_id);
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn has_access(&self, account_id: &Id, tenant: &TenantId) -> Result<bool, StoreError> {
        let inner = self.inner.lock();
        let Some(account) = inner.accounts.get(&account_id.0) else {
            return Ok(false);
        };
        if account.tenant_id.as_ref() == Some(tenant) {
            return Ok(true);
        }
        Ok(account.is_subscribed_to(tenant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccountRole;

    fn account(id: &str) -> Account {
        Account::new(
            Id(id.into()),
            format!("{id}@example.com"),
            vec![AccountRole::Fan],
        )
    }

    fn record(tenant: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            tenant_id: TenantId(tenant.into()),
            billing_subscription_id: format!("sub_{tenant}"),
            connected_account_id: format!("acct_{tenant}"),
        }
    }

    #[tokio::test]
    async fn add_subscription_is_idempotent() {
        let store = MemoryEntitlementStore::new();
        store.upsert_account(account("fan-1")).await.unwrap();

        for _ in 0..2 {
            store
                .add_subscription(
                    &Id("fan-1".into()),
                    record("creator-a"),
                    Some("cus_1".into()),
                )
                .await
                .unwrap();
        }

        let stored = store.account(&Id("fan-1".into())).await.unwrap().unwrap();
        assert_eq!(stored.subscribed_tenants, vec![TenantId("creator-a".into())]);
        assert_eq!(stored.active_subscriptions.len(), 1);
        assert_eq!(stored.billing_customer_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn remove_subscription_is_safe_without_matching_record() {
        let store = MemoryEntitlementStore::new();
        let mut acct = account("fan-2");
        // Subscribed set entry without a paired record, as a partial
        // failure in another backend could leave behind.
        acct.subscribed_tenants.push(TenantId("creator-b".into()));
        store.upsert_account(acct).await.unwrap();

        store
            .remove_subscription(&Id("fan-2".into()), &TenantId("creator-b".into()))
            .await
            .unwrap();

        let stored = store.account(&Id("fan-2".into())).await.unwrap().unwrap();
        assert!(stored.subscribed_tenants.is_empty());
        assert!(stored.active_subscriptions.is_empty());

        // Redelivery after full removal is still a success.
        store
            .remove_subscription(&Id("fan-2".into()), &TenantId("creator-b".into()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_subscription_tolerates_unknown_account() {
        let store = MemoryEntitlementStore::new();
        store
            .remove_subscription(&Id("ghost".into()), &TenantId("creator".into()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn subscribe_free_uses_set_semantics() {
        let store = MemoryEntitlementStore::new();
        store.upsert_account(account("fan-3")).await.unwrap();

        let tenant = TenantId("creator-c".into());
        store
            .subscribe_free(&Id("fan-3".into()), &tenant)
            .await
            .unwrap();
        let updated = store
            .subscribe_free(&Id("fan-3".into()), &tenant)
            .await
            .unwrap();
        assert_eq!(updated.subscribed_tenants, vec![tenant]);
        assert!(updated.active_subscriptions.is_empty());
    }

    #[tokio::test]
    async fn price_requires_completed_onboarding_and_clears_in_lockstep() {
        let store = MemoryEntitlementStore::new();
        let tenant_id = TenantId("creator-d".into());
        store
            .upsert_tenant(Tenant::new(tenant_id.clone(), "Creator D"))
            .await
            .unwrap();

        let err = store
            .set_price(&tenant_id, "price_1".into(), 500)
            .await
            .unwrap_err();
        assert_eq!(err.0.code.code, "SCHEMA.VALIDATION");

        store.set_onboarding(&tenant_id, true).await.unwrap();
        store
            .set_price(&tenant_id, "price_1".into(), 500)
            .await
            .unwrap();

        let stored = store.tenant(&tenant_id).await.unwrap().unwrap();
        assert_eq!(stored.price_id.as_deref(), Some("price_1"));
        assert_eq!(stored.price_minor_units, Some(500));

        store.clear_price(&tenant_id).await.unwrap();
        let cleared = store.tenant(&tenant_id).await.unwrap().unwrap();
        assert!(cleared.price_id.is_none());
        assert!(cleared.price_minor_units.is_none());
    }

    #[tokio::test]
    async fn retrieval_connection_handle_is_recorded() {
        let store = MemoryEntitlementStore::new();
        let tenant_id = TenantId("creator-f".into());
        store
            .upsert_tenant(Tenant::new(tenant_id.clone(), "Creator F"))
            .await
            .unwrap();

        store
            .set_retrieval_connection(&tenant_id, "conn_123".into())
            .await
            .unwrap();
        let stored = store.tenant(&tenant_id).await.unwrap().unwrap();
        assert_eq!(stored.retrieval_connection_id.as_deref(), Some("conn_123"));

        let err = store
            .set_retrieval_connection(&TenantId("missing".into()), "conn_9".into())
            .await
            .unwrap_err();
        assert_eq!(err.0.code.code, "STORE.NOT_FOUND");
    }

    #[tokio::test]
    async fn has_access_covers_owner_and_subscriber() {
        let store = MemoryEntitlementStore::new();
        let tenant = TenantId("creator-e".into());

        let mut owner = account("creator-e");
        owner.roles = vec![AccountRole::Creator];
        owner.tenant_id = Some(tenant.clone());
        store.upsert_account(owner).await.unwrap();
        store.upsert_account(account("fan-4")).await.unwrap();

        assert!(store
            .has_access(&Id("creator-e".into()), &tenant)
            .await
            .unwrap());
        assert!(!store.has_access(&Id("fan-4".into()), &tenant).await.unwrap());

        store
            .subscribe_free(&Id("fan-4".into()), &tenant)
            .await
            .unwrap();
        assert!(store.has_access(&Id("fan-4".into()), &tenant).await.unwrap());
        assert!(!store
            .has_access(&Id("stranger".into()), &tenant)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn concurrent_adds_do_not_lose_updates() {
        let store = MemoryEntitlementStore::new();
        store.upsert_account(account("fan-5")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add_subscription(&Id("fan-5".into()), record(&format!("creator-{i}")), None)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.account(&Id("fan-5".into())).await.unwrap().unwrap();
        assert_eq!(stored.subscribed_tenants.len(), 8);
        assert_eq!(stored.active_subscriptions.len(), 8);
    }
}
