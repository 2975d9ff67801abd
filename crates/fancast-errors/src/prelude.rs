pub use crate::codes::{self, ErrorCode, RetryClass};
pub use crate::obj::{ErrorBuilder, ErrorObj, PublicErrorView};
