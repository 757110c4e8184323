//! Run-report loading.
//!
//! Parses the JSON report produced by the Postman CLI step of the
//! pipeline. Loading is a pure read: the returned [`TestRunReport`] is
//! immutable and nothing else is touched.

use std::path::Path;

use serde::Deserialize;

/// Errors raised while loading a run report. All of these are fatal:
/// without a report there is nothing to reconcile.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Report file missing or unreadable.
    #[error("cannot read report {path}: {message}")]
    Io { path: String, message: String },

    /// File exists but is not valid JSON.
    #[error("report {path} is not valid JSON: {message}")]
    Json { path: String, message: String },

    /// Valid JSON without the expected `run`/`executions` shape.
    #[error("report {path} lacks the expected run/executions shape: {message}")]
    Shape { path: String, message: String },
}

/// A parsed test-run report: the collection name plus the executed
/// requests, in report order.
#[derive(Debug, Clone)]
pub struct TestRunReport {
    /// Collection name, carrying the run-level key tokens.
    pub collection: String,

    /// Executed requests, in the order the report lists them.
    pub executions: Vec<ExecutionRecord>,
}

/// One executed request and its assertion outcomes.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    /// Request name, carrying the case-key token.
    pub name: String,

    /// Request URL as executed.
    pub url: String,

    /// HTTP method.
    pub method: String,

    /// Query parameters derived from the URL.
    pub query: Vec<(String, String)>,

    /// Test-script source, when the report includes it.
    pub test_script: Option<String>,

    /// Assertion outcomes, in report order.
    pub assertions: Vec<AssertionOutcome>,
}

/// Outcome of a single assertion.
#[derive(Debug, Clone)]
pub struct AssertionOutcome {
    /// Assertion name.
    pub name: String,

    /// Whether the assertion reported `passed`.
    pub passed: bool,

    /// Error detail for failed assertions, when present.
    pub error: Option<String>,
}

// Wire shape, kept private. Lenient on everything except the
// run/executions skeleton.

#[derive(Debug, Deserialize)]
struct RawReport {
    run: RawRun,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(default)]
    meta: RawMeta,
    executions: Vec<RawExecution>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(rename = "collectionName", default)]
    collection_name: String,
}

#[derive(Debug, Deserialize)]
struct RawExecution {
    #[serde(rename = "requestExecuted")]
    request_executed: RawRequest,
    #[serde(default)]
    tests: Vec<RawTest>,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    method: String,
    #[serde(rename = "testScript", default)]
    test_script: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTest {
    #[serde(default)]
    status: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    error: Option<String>,
}

impl TestRunReport {
    /// Load a report from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let text = std::fs::read_to_string(path).map_err(|e| ReportError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;

        Self::from_json(&text, &display)
    }

    /// Parse report text. `path` is used for error context only.
    pub fn from_json(text: &str, path: &str) -> Result<Self, ReportError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ReportError::Json {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let raw: RawReport = serde_json::from_value(value).map_err(|e| ReportError::Shape {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            collection: raw.run.meta.collection_name,
            executions: raw.run.executions.into_iter().map(Into::into).collect(),
        })
    }
}

impl From<RawExecution> for ExecutionRecord {
    fn from(raw: RawExecution) -> Self {
        let request = raw.request_executed;
        Self {
            query: derive_query(&request.url),
            name: request.name,
            url: request.url,
            method: request.method,
            test_script: request.test_script,
            assertions: raw
                .tests
                .into_iter()
                .map(|t| AssertionOutcome {
                    passed: t.status.eq_ignore_ascii_case("passed"),
                    name: t.name,
                    error: t.error,
                })
                .collect(),
        }
    }
}

/// Query parameters from the executed URL. An unparseable URL yields
/// an empty list rather than an error.
fn derive_query(raw_url: &str) -> Vec<(String, String)> {
    match url::Url::parse(raw_url) {
        Ok(parsed) => parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(_) => Vec::new(),
    }
}
