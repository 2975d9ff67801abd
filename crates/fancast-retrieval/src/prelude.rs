pub use crate::client::{Retrieval, RetrievalClient, RetrievalConfig};
pub use crate::errors::RetrievalError;
pub use crate::service::{RetrievalService, StaticRetrieval};
