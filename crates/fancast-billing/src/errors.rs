use fancast_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct BillingError(pub ErrorObj);

impl BillingError {
    pub fn into_inner(self) -> ErrorObj {
        self.0
    }

    pub fn signature(detail: &str) -> Self {
        BillingError(
            ErrorBuilder::new(codes::BILLING_SIGNATURE)
                .user_msg("Invalid signature")
                .dev_msg(detail)
                .build(),
        )
    }

    pub fn schema(detail: &str) -> Self {
        BillingError(
            ErrorBuilder::new(codes::SCHEMA_VALIDATION)
                .user_msg("Malformed webhook payload.")
                .dev_msg(detail)
                .build(),
        )
    }
}

impl From<BillingError> for ErrorObj {
    fn from(value: BillingError) -> Self {
        value.0
    }
}
