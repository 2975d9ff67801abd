use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Url,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::RetrievalError;
use fancast_types::prelude::{PartitionKey, Passage, TenantId};

const DEFAULT_BASE_URL: &str = "https://api.ragie.ai/";
const RETRIEVALS_PATH: &str = "retrievals";
const CONNECTIONS_PATH: &str = "connections/oauth";

const TOP_K: u32 = 5;
const UNKNOWN_SOURCE: &str = "Unknown source";

/// Configuration options for the retrieval-service client.
#[derive(Clone, Debug)]
pub struct RetrievalConfig {
    pub api_key: String,
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl RetrievalConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, RetrievalError> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|err| RetrievalError::config(&format!("base url parse failed: {err}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            request_timeout: Duration::from_secs(30),
        })
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, RetrievalError> {
        self.base_url = Url::parse(base_url.as_ref())
            .map_err(|err| RetrievalError::config(&format!("base url parse failed: {err}")))?;
        if !self.base_url.path().ends_with('/') {
            self.base_url
                .set_path(&format!("{}/", self.base_url.path().trim_end_matches('/')));
        }
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Result of a context retrieval. A failing retrieval service never fails
/// the caller: it yields zero passages plus a warning the caller logs.
#[derive(Clone, Debug, PartialEq)]
pub struct Retrieval {
    pub passages: Vec<Passage>,
    pub warning: Option<String>,
}

impl Retrieval {
    fn degraded(warning: String) -> Self {
        Self {
            passages: Vec::new(),
            warning: Some(warning),
        }
    }
}

pub struct RetrievalClient {
    client: Client,
    retrievals_url: Url,
    connections_url: Url,
}

#[derive(Serialize)]
struct RetrievalsBody<'a> {
    query: &'a str,
    top_k: u32,
    rerank: bool,
    partition: &'a str,
}

#[derive(Deserialize)]
struct RetrievalsResponse {
    #[serde(default)]
    scored_chunks: Vec<ScoredChunk>,
}

#[derive(Deserialize)]
struct ScoredChunk {
    text: String,
    #[serde(default)]
    document_name: String,
}

#[derive(Serialize)]
struct ConnectionsBody<'a> {
    source_type: &'static str,
    redirect_uri: &'a str,
    partition: &'a str,
    metadata: ConnectionMetadata<'a>,
    mode: &'static str,
}

#[derive(Serialize)]
struct ConnectionMetadata<'a> {
    org_id: &'a str,
}

#[derive(Deserialize)]
struct ConnectionsResponse {
    url: String,
}

impl RetrievalClient {
    pub fn new(config: RetrievalConfig) -> Result<Self, RetrievalError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = format!("Bearer {}", config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|err| RetrievalError::config(&format!("invalid api key: {err}")))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| RetrievalError::config(&format!("client build failed: {err}")))?;

        let retrievals_url = config
            .base_url
            .join(RETRIEVALS_PATH)
            .map_err(|err| RetrievalError::config(&format!("retrievals url join failed: {err}")))?;
        let connections_url = config.base_url.join(CONNECTIONS_PATH).map_err(|err| {
            RetrievalError::config(&format!("connections url join failed: {err}"))
        })?;

        Ok(Self {
            client,
            retrievals_url,
            connections_url,
        })
    }

    /// Fetches ranked passages for `query` from the tenant's isolated
    /// partition. Top-5, reranked; ranking order is preserved as returned.
    pub async fn retrieve(&self, query: &str, tenant: &TenantId) -> Retrieval {
        let partition = PartitionKey::from_tenant(tenant);
        let body = RetrievalsBody {
            query,
            top_k: TOP_K,
            rerank: true,
            partition: partition.as_str(),
        };

        let response = match self
            .client
            .post(self.retrievals_url.clone())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return Retrieval::degraded(format!("retrieval request error: {err}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "retrieval service returned non-success: {detail}");
            return Retrieval::degraded(format!("retrieval service error: {}", status.as_u16()));
        }

        let parsed: RetrievalsResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(err) => {
                return Retrieval::degraded(format!("retrieval decode error: {err}"));
            }
        };

        let passages = parsed
            .scored_chunks
            .into_iter()
            .map(|chunk| Passage {
                text: chunk.text,
                source: if chunk.document_name.is_empty() {
                    UNKNOWN_SOURCE.to_string()
                } else {
                    chunk.document_name
                },
            })
            .collect();

        Retrieval {
            passages,
            warning: None,
        }
    }

    /// Starts an OAuth hand-off ingesting the tenant's drive into its
    /// partition. Unlike [`retrieve`](Self::retrieve), a failure here is a
    /// hard error: there is no degraded mode for onboarding.
    pub async fn init_drive_connection(
        &self,
        tenant: &TenantId,
        redirect_uri: &str,
    ) -> Result<String, RetrievalError> {
        let partition = PartitionKey::from_tenant(tenant);
        let body = ConnectionsBody {
            source_type: "google_drive",
            redirect_uri,
            partition: partition.as_str(),
            metadata: ConnectionMetadata {
                org_id: tenant.as_str(),
            },
            mode: "hi_res",
        };

        let response = self
            .client
            .post(self.connections_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                RetrievalError::provider_unavailable(&format!("connection request error: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RetrievalError::connection_rejected(&format!(
                "status {status}: {detail}"
            )));
        }

        let parsed: ConnectionsResponse = response.json().await.map_err(|err| {
            RetrievalError::provider_unavailable(&format!("connection decode error: {err}"))
        })?;
        Ok(parsed.url)
    }
}
