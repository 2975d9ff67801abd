use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fancast_types::prelude::{Id, TenantId};

/// Role tags an account can carry. Not mutually exclusive: a creator may
/// also subscribe to other tenants as a fan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Creator,
    Fan,
}

/// One paid subscription held by an account, tied 1:1 to the payment
/// processor's subscription lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub tenant_id: TenantId,
    pub billing_subscription_id: String,
    pub connected_account_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Id,
    pub email: String,
    pub roles: Vec<AccountRole>,
    /// The tenant this account owns, when the account is a creator.
    pub tenant_id: Option<TenantId>,
    /// Set semantics: a tenant appears at most once.
    pub subscribed_tenants: Vec<TenantId>,
    pub billing_customer_id: Option<String>,
    pub active_subscriptions: Vec<SubscriptionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: Id, email: impl Into<String>, roles: Vec<AccountRole>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            roles,
            tenant_id: None,
            subscribed_tenants: Vec::new(),
            billing_customer_id: None,
            active_subscriptions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_subscribed_to(&self, tenant: &TenantId) -> bool {
        self.subscribed_tenants.iter().any(|t| t == tenant)
    }
}

/// A creator's isolated content-and-billing namespace. The id equals the
/// owning creator's subject id; the record is created at creator sign-up
/// and never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub retrieval_connection_id: Option<String>,
    pub billing_account_id: Option<String>,
    pub billing_onboarding_complete: bool,
    /// Price handle and amount are set and cleared together, and only
    /// exist once onboarding is complete.
    pub price_id: Option<String>,
    pub price_minor_units: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(id: TenantId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            retrieval_connection_id: None,
            billing_account_id: None,
            billing_onboarding_complete: false,
            price_id: None,
            price_minor_units: None,
            created_at: now,
            updated_at: now,
        }
    }
}
