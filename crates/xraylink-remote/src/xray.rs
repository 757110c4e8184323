//! Test-management (Xray-style) client.
//!
//! Authentication is a client-credential exchange performed once per
//! run: [`XrayClient::authenticate`] trades the id/secret pair for a
//! bearer token and returns an [`XraySession`] holding it. The session
//! is read-only after that point; there is no refresh, no global
//! state. Association mutations go through the GraphQL endpoint,
//! result import through the REST import endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::json;
use tracing::{debug, info};

use xraylink_core::{TestManagement, Verdict};

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::USER_AGENT_VALUE;

/// Unauthenticated client, only able to exchange credentials.
#[derive(Debug, Clone)]
pub struct XrayClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl XrayClient {
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| RemoteError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.tm_url.trim_end_matches('/').to_string(),
            client_id: config.tm_client_id.clone(),
            client_secret: config.tm_client_secret.clone(),
        })
    }

    /// Exchange client credentials for a bearer token. A failure here
    /// is fatal for the run: no later call could succeed.
    pub async fn authenticate(&self) -> RemoteResult<XraySession> {
        let url = format!("{}/api/v2/authenticate", self.base_url);
        debug!(url = %url, "exchanging client credentials");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Unauthorized {
                message: format!("credential exchange rejected: {}", body),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The token comes back as a bare JSON string.
        let token: String = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                message: format!("failed to parse token response: {}", e),
            })?;
        if token.is_empty() {
            return Err(RemoteError::InvalidResponse {
                message: "credential exchange returned an empty token".to_string(),
            });
        }

        info!("obtained test-management session token");
        Ok(XraySession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token,
        })
    }
}

/// Authenticated session, scoped to one run. The token is acquired
/// once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct XraySession {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl XraySession {
    /// POST a JSON body with the session token. Non-2xx responses
    /// become [`RemoteError`] here and nowhere else.
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> RemoteResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "test-management request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(response),
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Unauthorized {
                    message: format!("session token rejected: {}", body),
                })
            }
            _ => {
                let body = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(RemoteError::Api {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Run a GraphQL mutation. GraphQL-level errors arrive with a 2xx
    /// status and surface as `InvalidResponse`.
    async fn graphql(&self, query: &str) -> RemoteResult<serde_json::Value> {
        let response = self
            .post_json("/api/v2/graphql", json!({ "query": query }))
            .await?;

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| RemoteError::InvalidResponse {
                    message: format!("failed to parse GraphQL response: {}", e),
                })?;

        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                return Err(RemoteError::InvalidResponse {
                    message: format!(
                        "GraphQL errors: {}",
                        serde_json::Value::Array(errors.clone())
                    ),
                });
            }
        }

        Ok(body)
    }
}

#[async_trait]
impl TestManagement for XraySession {
    async fn add_test_to_set(&self, set_key: &str, case_issue_key: &str) -> anyhow::Result<()> {
        let mutation = format!(
            r#"mutation {{ addTestsToTestSet(testSetKey: "{set_key}", testKeys: ["{case_issue_key}"]) {{ warning }} }}"#
        );
        self.graphql(&mutation).await?;
        Ok(())
    }

    async fn add_test_to_execution(
        &self,
        execution_key: &str,
        case_issue_key: &str,
    ) -> anyhow::Result<()> {
        let mutation = format!(
            r#"mutation {{ addTestsToTestExecution(testExecutionKey: "{execution_key}", testKeys: ["{case_issue_key}"]) {{ warning }} }}"#
        );
        self.graphql(&mutation).await?;
        Ok(())
    }

    async fn import_result(
        &self,
        execution_key: &str,
        case_issue_key: &str,
        verdict: Verdict,
        comment: Option<&str>,
    ) -> anyhow::Result<()> {
        let body = json!({
            "testExecutionKey": execution_key,
            "tests": [{
                "testKey": case_issue_key,
                "status": verdict.as_status(),
                "comment": comment,
            }],
        });
        self.post_json("/api/v2/import/execution", body).await?;
        Ok(())
    }
}
