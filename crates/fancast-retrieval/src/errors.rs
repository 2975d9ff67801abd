use fancast_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct RetrievalError(pub ErrorObj);

impl RetrievalError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn config(detail: &str) -> Self {
        RetrievalError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg("Retrieval client configuration is invalid.")
                .dev_msg(detail)
                .build(),
        )
    }

    pub fn provider_unavailable(detail: &str) -> Self {
        RetrievalError(
            ErrorBuilder::new(codes::PROVIDER_UNAVAILABLE)
                .user_msg("Content service is unavailable.")
                .dev_msg(detail)
                .build(),
        )
    }

    pub fn connection_rejected(detail: &str) -> Self {
        RetrievalError(
            ErrorBuilder::new(codes::PROVIDER_UNAVAILABLE)
                .user_msg("Failed to initialize the content connection.")
                .dev_msg(detail)
                .build(),
        )
    }
}

impl From<RetrievalError> for ErrorObj {
    fn from(value: RetrievalError) -> Self {
        value.0
    }
}
