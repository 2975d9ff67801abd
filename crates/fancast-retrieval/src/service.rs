use async_trait::async_trait;
use parking_lot::Mutex;

use crate::client::{Retrieval, RetrievalClient};
use crate::errors::RetrievalError;
use fancast_types::prelude::{Passage, TenantId};

/// The retrieval service as the rest of the system sees it: tenant-scoped
/// context lookup plus the one-shot content-source connection bootstrap.
#[async_trait]
pub trait RetrievalService: Send + Sync {
    /// Never fails the caller; a degraded service yields zero passages and
    /// a warning for the caller to log.
    async fn retrieve(&self, query: &str, tenant: &TenantId) -> Retrieval;

    async fn init_drive_connection(
        &self,
        tenant: &TenantId,
        redirect_uri: &str,
    ) -> Result<String, RetrievalError>;
}

#[async_trait]
impl RetrievalService for RetrievalClient {
    async fn retrieve(&self, query: &str, tenant: &TenantId) -> Retrieval {
        RetrievalClient::retrieve(self, query, tenant).await
    }

    async fn init_drive_connection(
        &self,
        tenant: &TenantId,
        redirect_uri: &str,
    ) -> Result<String, RetrievalError> {
        RetrievalClient::init_drive_connection(self, tenant, redirect_uri).await
    }
}

/// Test double serving fixed passages, with a call counter so tests can
/// assert the orchestrator never reaches retrieval on a rejected request.
#[derive(Default)]
pub struct StaticRetrieval {
    passages: Vec<Passage>,
    warning: Option<String>,
    connect_url: String,
    retrieve_calls: Mutex<u64>,
}

impl StaticRetrieval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passages(mut self, passages: Vec<Passage>) -> Self {
        self.passages = passages;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn with_connect_url(mut self, url: impl Into<String>) -> Self {
        self.connect_url = url.into();
        self
    }

    pub fn retrieve_calls(&self) -> u64 {
        *self.retrieve_calls.lock()
    }
}

#[async_trait]
impl RetrievalService for StaticRetrieval {
    async fn retrieve(&self, _query: &str, _tenant: &TenantId) -> Retrieval {
        *self.retrieve_calls.lock() += 1;
        Retrieval {
            passages: self.passages.clone(),
            warning: self.warning.clone(),
        }
    }

    async fn init_drive_connection(
        &self,
        _tenant: &TenantId,
        _redirect_uri: &str,
    ) -> Result<String, RetrievalError> {
        Ok(self.connect_url.clone())
    }
}
