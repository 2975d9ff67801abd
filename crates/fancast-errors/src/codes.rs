use serde::{Deserialize, Serialize};

/// Whether a failed operation is worth redelivering. Only the payment
/// processor's webhook redelivery consults this; nothing in the core
/// retries outbound calls on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryClass {
    None,
    Transient,
    Permanent,
}

impl RetryClass {
    pub const fn is_retryable(self) -> bool {
        matches!(self, RetryClass::Transient)
    }
}

/// A stable error code: the only part of an error that crosses the wire
/// unchanged. HTTP status and retry class ride along so every surface maps
/// a code identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: &'static str,
    pub http_status: u16,
    pub retry: RetryClass,
}

pub const AUTH_UNAUTHENTICATED: ErrorCode = ErrorCode {
    code: "AUTH.UNAUTHENTICATED",
    http_status: 401,
    retry: RetryClass::Permanent,
};

pub const AUTH_FORBIDDEN: ErrorCode = ErrorCode {
    code: "AUTH.FORBIDDEN",
    http_status: 403,
    retry: RetryClass::Permanent,
};

pub const SCHEMA_VALIDATION: ErrorCode = ErrorCode {
    code: "SCHEMA.VALIDATION",
    http_status: 400,
    retry: RetryClass::Permanent,
};

pub const PROVIDER_UNAVAILABLE: ErrorCode = ErrorCode {
    code: "PROVIDER.UNAVAILABLE",
    http_status: 502,
    retry: RetryClass::Transient,
};

pub const BILLING_SIGNATURE: ErrorCode = ErrorCode {
    code: "BILLING.SIGNATURE",
    http_status: 400,
    retry: RetryClass::Permanent,
};

pub const STORE_NOT_FOUND: ErrorCode = ErrorCode {
    code: "STORE.NOT_FOUND",
    http_status: 404,
    retry: RetryClass::Permanent,
};

pub const UNKNOWN_INTERNAL: ErrorCode = ErrorCode {
    code: "UNKNOWN.INTERNAL",
    http_status: 500,
    retry: RetryClass::Transient,
};
