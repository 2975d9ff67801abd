pub use crate::errors::StoreError;
pub use crate::memory::MemoryEntitlementStore;
pub use crate::model::{Account, AccountRole, SubscriptionRecord, Tenant};
pub use crate::store::EntitlementStore;
