use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use fancast_types::prelude::Id;

/// The authenticated caller as confirmed by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    pub subject_id: Id,
    pub email: String,
}

/// Validates an opaque bearer credential and yields the stable subject
/// behind it.
///
/// Implementations fail open to `None`: a missing token, a malformed
/// token, an unreachable provider, and a non-success provider response all
/// look identical to the caller. Callers treat `None` uniformly as
/// unauthenticated and never distinguish provider-down from invalid-token.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Option<VerifiedUser>;
}

/// Test double resolving fixed tokens, with a call counter so tests can
/// assert that rejected requests never reach downstream services.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, VerifiedUser>,
    calls: Mutex<u64>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user: VerifiedUser) -> Self {
        self.tokens.insert(token.into(), user);
        self
    }

    pub fn call_count(&self) -> u64 {
        *self.calls.lock()
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, id_token: &str) -> Option<VerifiedUser> {
        *self.calls.lock() += 1;
        self.tokens.get(id_token).cloned()
    }
}
