//! Remote-service seams.
//!
//! The reconciler talks to the issue tracker and the test-management
//! service through these traits so its state machine can be exercised
//! against in-memory fakes. Concrete HTTP clients implement them in
//! `xraylink-remote`.

use async_trait::async_trait;

use crate::verdict::Verdict;

/// Issue status rolled up to the tracker's category triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// To-do / open category.
    Open,
    /// In-progress category.
    InProgress,
    /// Done category; a bug here counts as closed.
    Done,
}

impl StatusCategory {
    /// Whether a bug in this category needs reopening on failure.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// An issue as seen in the tracker: just enough identity and state
/// for reconciliation decisions.
#[derive(Debug, Clone)]
pub struct RemoteIssue {
    /// Tracker key, e.g. `PROJ-42`.
    pub key: String,

    /// Issue summary text.
    pub summary: String,

    /// Status name as configured in the tracker workflow.
    pub status: String,

    /// Status rolled up to its category.
    pub category: StatusCategory,
}

/// Issue-tracker operations the reconciler needs. Lookups are
/// search-before-create: `find_*` returning `None` is the only path
/// to `create_*`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Find the test case carrying `case_key`, newest first.
    async fn find_test_case(&self, case_key: &str) -> anyhow::Result<Option<RemoteIssue>>;

    /// Create a test case for `case_key`. Only called after a miss.
    async fn create_test_case(
        &self,
        case_key: &str,
        summary: &str,
    ) -> anyhow::Result<RemoteIssue>;

    /// Find the bug tracking failures of `case_key`, newest first.
    async fn find_bug(&self, case_key: &str) -> anyhow::Result<Option<RemoteIssue>>;

    /// Create a bug for `case_key`. Only called after a miss.
    async fn create_bug(
        &self,
        case_key: &str,
        summary: &str,
        description: &str,
    ) -> anyhow::Result<RemoteIssue>;

    /// Link two issues (bug to its test case).
    async fn link_issues(&self, inward_key: &str, outward_key: &str) -> anyhow::Result<()>;

    /// Transition an issue back into an open state.
    async fn reopen_issue(&self, issue_key: &str) -> anyhow::Result<()>;

    /// Transition an issue into the done category.
    async fn close_issue(&self, issue_key: &str) -> anyhow::Result<()>;
}

/// Test-management operations: set/execution association and result
/// import. `case_issue_key` is always the tracker key of the test
/// case, not the logical case key.
#[async_trait]
pub trait TestManagement: Send + Sync {
    /// Associate a test case with a test set.
    async fn add_test_to_set(&self, set_key: &str, case_issue_key: &str) -> anyhow::Result<()>;

    /// Associate a test case with a test execution.
    async fn add_test_to_execution(
        &self,
        execution_key: &str,
        case_issue_key: &str,
    ) -> anyhow::Result<()>;

    /// Import one execution result.
    async fn import_result(
        &self,
        execution_key: &str,
        case_issue_key: &str,
        verdict: Verdict,
        comment: Option<&str>,
    ) -> anyhow::Result<()>;
}
