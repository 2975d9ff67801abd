use fancast_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct StoreError(pub ErrorObj);

impl StoreError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn not_found(detail: &str) -> Self {
        StoreError(
            ErrorBuilder::new(codes::STORE_NOT_FOUND)
                .user_msg("Record not found.")
                .dev_msg(detail)
                .build(),
        )
    }

    pub fn precondition(detail: &str) -> Self {
        StoreError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg("Operation not allowed in the record's current state.")
                .dev_msg(detail)
                .build(),
        )
    }
}

impl From<StoreError> for ErrorObj {
    fn from(value: StoreError) -> Self {
        value.0
    }
}
