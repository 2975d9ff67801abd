use serde::Serialize;

use crate::codes::{ErrorCode, RetryClass};

/// The internal error value carried between crates. `message_user` is safe
/// to show to an end caller; `message_dev` holds the diagnostic detail and
/// only ever reaches logs.
#[derive(Clone, Debug)]
pub struct ErrorObj {
    pub code: ErrorCode,
    pub message_user: String,
    pub message_dev: Option<String>,
}

impl ErrorObj {
    pub fn to_public(&self) -> PublicErrorView {
        PublicErrorView {
            code: self.code.code,
            message: self.message_user.clone(),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status
    }

    pub fn retry(&self) -> RetryClass {
        self.code.retry
    }
}

impl std::fmt::Display for ErrorObj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message_dev.as_deref() {
            Some(dev) => write!(f, "{}: {dev}", self.code.code),
            None => write!(f, "{}: {}", self.code.code, self.message_user),
        }
    }
}

/// The caller-visible projection of an error: stable code plus the generic
/// user message, nothing else.
#[derive(Clone, Debug, Serialize)]
pub struct PublicErrorView {
    pub code: &'static str,
    pub message: String,
}

pub struct ErrorBuilder {
    code: ErrorCode,
    message_user: Option<String>,
    message_dev: Option<String>,
}

impl ErrorBuilder {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message_user: None,
            message_dev: None,
        }
    }

    pub fn user_msg(mut self, msg: impl Into<String>) -> Self {
        self.message_user = Some(msg.into());
        self
    }

    pub fn dev_msg(mut self, msg: impl Into<String>) -> Self {
        self.message_dev = Some(msg.into());
        self
    }

    pub fn build(self) -> ErrorObj {
        ErrorObj {
            code: self.code,
            message_user: self
                .message_user
                .unwrap_or_else(|| "An internal error occurred.".to_string()),
            message_dev: self.message_dev,
        }
    }
}
