use fancast_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct LlmError(pub ErrorObj);

impl LlmError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn provider_unavailable(detail: &str) -> Self {
        LlmError(
            ErrorBuilder::new(codes::PROVIDER_UNAVAILABLE)
                .user_msg("The model service is unavailable.")
                .dev_msg(detail)
                .build(),
        )
    }

    pub fn schema(detail: &str) -> Self {
        LlmError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg("The model request was rejected.")
                .dev_msg(detail)
                .build(),
        )
    }

    pub fn unknown(detail: &str) -> Self {
        LlmError(
            ErrorBuilder::new(codes::UNKNOWN_INTERNAL)
                .user_msg("Model invocation failed.")
                .dev_msg(detail)
                .build(),
        )
    }
}

impl From<LlmError> for ErrorObj {
    fn from(value: LlmError) -> Self {
        value.0
    }
}
