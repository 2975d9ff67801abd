use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::verifier::{IdentityVerifier, VerifiedUser};
use fancast_types::prelude::Id;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1/";
const LOOKUP_PATH: &str = "accounts:lookup";

/// Configuration for the hosted identity provider's token-lookup endpoint.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub api_key: String,
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl IdentityConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            request_timeout: Duration::from_secs(10),
        })
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.base_url = Url::parse(base_url.as_ref())?;
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

/// Verifier backed by the identity provider's `accounts:lookup` call.
///
/// One round trip per request, no retry: a transient provider failure
/// surfaces as an authentication failure, not a system error.
pub struct IdentityToolkitVerifier {
    client: Client,
    lookup_url: Url,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(default)]
    email: String,
}

impl IdentityToolkitVerifier {
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityBuildError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| IdentityBuildError(err.to_string()))?;
        let mut lookup_url = config
            .base_url
            .join(LOOKUP_PATH)
            .map_err(|err| IdentityBuildError(err.to_string()))?;
        lookup_url
            .query_pairs_mut()
            .append_pair("key", &config.api_key);
        Ok(Self { client, lookup_url })
    }
}

#[derive(Debug)]
pub struct IdentityBuildError(pub String);

impl std::fmt::Display for IdentityBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "identity verifier build failed: {}", self.0)
    }
}

impl std::error::Error for IdentityBuildError {}

#[async_trait]
impl IdentityVerifier for IdentityToolkitVerifier {
    async fn verify(&self, id_token: &str) -> Option<VerifiedUser> {
        if id_token.is_empty() {
            return None;
        }

        let response = match self
            .client
            .post(self.lookup_url.clone())
            .json(&json!({ "idToken": id_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!("identity lookup unreachable: {err}");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "identity lookup rejected token");
            return None;
        }

        let body: LookupResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                debug!("identity lookup decode failed: {err}");
                return None;
            }
        };

        let user = body.users.into_iter().next()?;
        Some(VerifiedUser {
            subject_id: Id(user.local_id),
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn verifier_for(server: &MockServer) -> IdentityToolkitVerifier {
        let config = IdentityConfig::new("test-key")
            .unwrap()
            .with_base_url(server.uri())
            .unwrap();
        IdentityToolkitVerifier::new(config).unwrap()
    }

    #[tokio::test]
    async fn verify_resolves_subject_and_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({ "idToken": "tok-abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{ "localId": "uid-1", "email": "fan@example.com" }]
            })))
            .mount(&server)
            .await;

        let verified = verifier_for(&server).await.verify("tok-abc").await;
        assert_eq!(
            verified,
            Some(VerifiedUser {
                subject_id: Id("uid-1".into()),
                email: "fan@example.com".into(),
            })
        );
    }

    #[tokio::test]
    async fn verify_fails_open_on_provider_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "INVALID_ID_TOKEN" }
            })))
            .mount(&server)
            .await;

        assert_eq!(verifier_for(&server).await.verify("bad").await, None);
    }

    #[tokio::test]
    async fn verify_fails_open_on_empty_user_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
            .mount(&server)
            .await;

        assert_eq!(verifier_for(&server).await.verify("tok").await, None);
    }

    #[tokio::test]
    async fn empty_token_short_circuits_without_a_request() {
        let server = MockServer::start().await;
        // No mock mounted: any request would fail the test via 404 + panic on
        // wiremock verification. An empty token must not produce a request.
        let verified = verifier_for(&server).await.verify("").await;
        assert_eq!(verified, None);
    }
}
