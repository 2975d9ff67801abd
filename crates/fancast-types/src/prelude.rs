pub use crate::chat::{window_history, ChatRole, ChatTurn, Passage, HISTORY_WINDOW};
pub use crate::id::Id;
pub use crate::tenant::{PartitionKey, TenantId};
