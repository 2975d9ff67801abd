use std::sync::Arc;

use tracing::warn;

use crate::config::FancastConfig;
use crate::metrics::MeterRegistry;
use fancast_auth::prelude::{IdentityConfig, IdentityToolkitVerifier, IdentityVerifier};
use fancast_billing::prelude::Reconciler;
use fancast_entitle::prelude::{EntitlementStore, MemoryEntitlementStore};
use fancast_llm::prelude::{ChatModel, LocalEchoModel, OpenAiConfig, SseChatModel};
use fancast_retrieval::prelude::{RetrievalClient, RetrievalConfig, RetrievalService};

/// Fixed sampling parameters forwarded with every completion call.
#[derive(Clone, Debug)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub retrieval: Arc<dyn RetrievalService>,
    pub model: Arc<dyn ChatModel>,
    pub store: Arc<dyn EntitlementStore>,
    pub reconciler: Reconciler,
    pub chat: ChatSettings,
    pub webhook_secret: String,
    pub app_url: String,
    pub meter: MeterRegistry,
}

impl AppState {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        retrieval: Arc<dyn RetrievalService>,
        model: Arc<dyn ChatModel>,
        store: Arc<dyn EntitlementStore>,
        chat: ChatSettings,
        webhook_secret: impl Into<String>,
        app_url: impl Into<String>,
    ) -> Self {
        let reconciler = Reconciler::new(store.clone());
        Self {
            verifier,
            retrieval,
            model,
            store,
            reconciler,
            chat,
            webhook_secret: webhook_secret.into(),
            app_url: app_url.into(),
            meter: MeterRegistry::default(),
        }
    }

    pub fn from_config(config: &FancastConfig) -> anyhow::Result<Self> {
        let mut identity_cfg = IdentityConfig::new(config.identity.api_key.clone())?;
        if let Some(base_url) = config.identity.base_url.as_deref() {
            identity_cfg = identity_cfg.with_base_url(base_url)?;
        }
        let verifier: Arc<dyn IdentityVerifier> =
            Arc::new(IdentityToolkitVerifier::new(identity_cfg)?);

        let mut retrieval_cfg = RetrievalConfig::new(config.retrieval.api_key.clone())?;
        if let Some(base_url) = config.retrieval.base_url.as_deref() {
            retrieval_cfg = retrieval_cfg.with_base_url(base_url)?;
        }
        let retrieval: Arc<dyn RetrievalService> = Arc::new(RetrievalClient::new(retrieval_cfg)?);

        let model: Arc<dyn ChatModel> = if config.llm.api_key.is_empty() {
            warn!("llm.api_key not set; using the in-process echo model");
            Arc::new(LocalEchoModel::new())
        } else {
            let mut llm_cfg = OpenAiConfig::new(config.llm.api_key.clone())?;
            if let Some(base_url) = config.llm.base_url.as_deref() {
                llm_cfg = llm_cfg.with_base_url(base_url)?;
            }
            Arc::new(SseChatModel::new(llm_cfg)?)
        };

        let store: Arc<dyn EntitlementStore> = Arc::new(MemoryEntitlementStore::new());

        Ok(Self::new(
            verifier,
            retrieval,
            model,
            store,
            ChatSettings {
                model: config.llm.model.clone(),
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
            },
            config.billing.webhook_secret.clone(),
            config.app_url.clone(),
        ))
    }
}
