//! Jira REST client.
//!
//! All status-code mapping happens in [`JiraClient::request`]; the
//! public wrappers never interpret status codes. The `IssueTracker`
//! impl at the bottom is the only place JQL is built.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use xraylink_core::{IssueTracker, RemoteIssue, StatusCategory};

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::USER_AGENT_VALUE;

/// Link type used for bug-to-case links.
pub const LINK_TYPE: &str = "Relates";

/// An issue as returned by the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: IssueStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueStatus {
    pub name: String,
    #[serde(rename = "statusCategory")]
    pub category: CategoryRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    pub key: String,
}

/// A workflow transition offered on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub to: TransitionTarget,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionTarget {
    pub name: String,
    #[serde(rename = "statusCategory")]
    pub category: CategoryRef,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

/// What a transition should accomplish. Selection policy:
/// `Close` takes the first transition landing in the done category,
/// `Reopen` the first whose name or destination mentions "reopen".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionIntent {
    Reopen,
    Close,
}

impl TransitionIntent {
    fn matches(&self, transition: &Transition) -> bool {
        match self {
            Self::Close => transition.to.category.key == "done",
            Self::Reopen => {
                transition.to.category.key != "done"
                    && (transition.name.to_ascii_lowercase().contains("reopen")
                        || transition.to.name.to_ascii_lowercase().contains("reopen"))
            }
        }
    }

    fn target(&self) -> &'static str {
        match self {
            Self::Reopen => "reopened",
            Self::Close => "closed",
        }
    }
}

/// Issue-tracker REST client with basic auth.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    token: String,
    project_key: String,
    bug_issue_type: String,
    test_issue_type: String,
}

impl JiraClient {
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
            base_url: config.tracker_url.trim_end_matches('/').to_string(),
            user: config.tracker_user.clone(),
            token: config.tracker_token.clone(),
            project_key: config.project_key.clone(),
            bug_issue_type: config.bug_issue_type.clone(),
            test_issue_type: config.test_issue_type.clone(),
        })
    }

    /// Make a single request. Non-2xx responses become [`RemoteError`]
    /// here and nowhere else.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> RemoteResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "tracker request");

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.user, Some(&self.token));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => Ok(response),
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Unauthorized {
                    message: format!("tracker rejected credentials: {}", body),
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

    /// Search issues by JQL, newest-first ordering left to the query.
    pub async fn search_issues(&self, jql: &str) -> RemoteResult<Vec<Issue>> {
        let body = json!({
            "jql": jql,
            "maxResults": 10,
            "fields": ["summary", "status"],
        });
        let response = self
            .request(Method::POST, "/rest/api/2/search", Some(body))
            .await?;

        let page: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| RemoteError::InvalidResponse {
                    message: format!("failed to parse search response: {}", e),
                })?;
        Ok(page.issues)
    }

    /// Create an issue; returns its key.
    pub async fn create_issue(
        &self,
        issue_type: &str,
        summary: &str,
        description: &str,
    ) -> RemoteResult<String> {
        let body = json!({
            "fields": {
                "project": { "key": self.project_key },
                "issuetype": { "name": issue_type },
                "summary": summary,
                "description": description,
            }
        });
        let response = self
            .request(Method::POST, "/rest/api/2/issue", Some(body))
            .await?;

        let created: CreatedIssue =
            response
                .json()
                .await
                .map_err(|e| RemoteError::InvalidResponse {
                    message: format!("failed to parse create response: {}", e),
                })?;
        Ok(created.key)
    }

    pub async fn get_issue(&self, key: &str) -> RemoteResult<Issue> {
        let path = format!("/rest/api/2/issue/{key}?fields=summary,status");
        let response = self.request(Method::GET, &path, None).await?;

        response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                message: format!("failed to parse issue response: {}", e),
            })
    }

    pub async fn list_transitions(&self, key: &str) -> RemoteResult<Vec<Transition>> {
        let path = format!("/rest/api/2/issue/{key}/transitions");
        let response = self.request(Method::GET, &path, None).await?;

        let listed: TransitionsResponse =
            response
                .json()
                .await
                .map_err(|e| RemoteError::InvalidResponse {
                    message: format!("failed to parse transitions response: {}", e),
                })?;
        Ok(listed.transitions)
    }

    pub async fn apply_transition(&self, key: &str, transition_id: &str) -> RemoteResult<()> {
        let path = format!("/rest/api/2/issue/{key}/transitions");
        let body = json!({ "transition": { "id": transition_id } });
        self.request(Method::POST, &path, Some(body)).await?;
        Ok(())
    }

    /// Lookup-and-apply: list the transitions the workflow offers and
    /// apply the first one matching the intent.
    pub async fn transition_towards(
        &self,
        key: &str,
        intent: TransitionIntent,
    ) -> RemoteResult<()> {
        let transitions = self.list_transitions(key).await?;
        let chosen = transitions
            .iter()
            .find(|t| intent.matches(t))
            .ok_or_else(|| RemoteError::NoTransition {
                issue: key.to_string(),
                target: intent.target().to_string(),
            })?;

        debug!(issue = %key, transition = %chosen.name, to = %chosen.to.name, "applying transition");
        self.apply_transition(key, &chosen.id).await
    }

    pub async fn create_link(
        &self,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
    ) -> RemoteResult<()> {
        let body = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": inward_key },
            "outwardIssue": { "key": outward_key },
        });
        self.request(Method::POST, "/rest/api/2/issueLink", Some(body))
            .await?;
        Ok(())
    }

    fn summary_jql(&self, issue_type: &str, case_key: &str) -> String {
        format!(
            r#"project = {} AND issuetype = "{}" AND summary ~ "\"[{}]\"" ORDER BY created DESC"#,
            self.project_key, issue_type, case_key
        )
    }
}

fn to_remote(issue: Issue) -> RemoteIssue {
    let category = match issue.fields.status.category.key.as_str() {
        "done" => StatusCategory::Done,
        "indeterminate" => StatusCategory::InProgress,
        _ => StatusCategory::Open,
    };
    RemoteIssue {
        key: issue.key,
        summary: issue.fields.summary,
        status: issue.fields.status.name,
        category,
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn find_test_case(&self, case_key: &str) -> anyhow::Result<Option<RemoteIssue>> {
        let jql = self.summary_jql(&self.test_issue_type, case_key);
        let issues = self.search_issues(&jql).await?;
        Ok(issues.into_iter().next().map(to_remote))
    }

    async fn create_test_case(
        &self,
        case_key: &str,
        summary: &str,
    ) -> anyhow::Result<RemoteIssue> {
        let description = format!("Automated test case {case_key}, maintained by xraylink.");
        let key = self
            .create_issue(&self.test_issue_type, summary, &description)
            .await?;
        let issue = self.get_issue(&key).await?;
        Ok(to_remote(issue))
    }

    async fn find_bug(&self, case_key: &str) -> anyhow::Result<Option<RemoteIssue>> {
        let jql = self.summary_jql(&self.bug_issue_type, case_key);
        let issues = self.search_issues(&jql).await?;
        Ok(issues.into_iter().next().map(to_remote))
    }

    async fn create_bug(
        &self,
        _case_key: &str,
        summary: &str,
        description: &str,
    ) -> anyhow::Result<RemoteIssue> {
        let key = self
            .create_issue(&self.bug_issue_type, summary, description)
            .await?;
        let issue = self.get_issue(&key).await?;
        Ok(to_remote(issue))
    }

    async fn link_issues(&self, inward_key: &str, outward_key: &str) -> anyhow::Result<()> {
        self.create_link(LINK_TYPE, inward_key, outward_key).await?;
        Ok(())
    }

    async fn reopen_issue(&self, issue_key: &str) -> anyhow::Result<()> {
        self.transition_towards(issue_key, TransitionIntent::Reopen)
            .await?;
        Ok(())
    }

    async fn close_issue(&self, issue_key: &str) -> anyhow::Result<()> {
        self.transition_towards(issue_key, TransitionIntent::Close)
            .await?;
        Ok(())
    }
}
