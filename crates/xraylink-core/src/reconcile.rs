//! The reconciler: diffs parsed verdicts against remote tracker state
//! and issues the minimal set of operations to bring it up to date.
//!
//! Records are processed strictly sequentially, one remote call at a
//! time. Each record is independent: a remote failure inside one
//! record is logged and counted, never propagated to the rest of the
//! run. Only a collection name without run-level keys aborts.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::keys::{CollectionKeyError, KeyPatterns, ParsedKeys};
use crate::remote::{IssueTracker, RemoteIssue, TestManagement};
use crate::report::{ExecutionRecord, TestRunReport};
use crate::verdict::Verdict;

/// Per-run outcome counts, reported to the user at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records fully reconciled.
    pub processed: usize,

    /// Records skipped because the request name had no key token.
    pub skipped: usize,

    /// Records abandoned after a remote failure.
    pub errored: usize,
}

impl RunSummary {
    /// True when no record hit a remote failure.
    pub fn is_clean(&self) -> bool {
        self.errored == 0
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed, {} skipped, {} errored",
            self.processed, self.skipped, self.errored
        )
    }
}

/// Sequential reconciliation of one run report against remote state.
pub struct Reconciler {
    tracker: Arc<dyn IssueTracker>,
    tests: Arc<dyn TestManagement>,
    patterns: KeyPatterns,
}

impl Reconciler {
    pub fn new(tracker: Arc<dyn IssueTracker>, tests: Arc<dyn TestManagement>) -> Self {
        Self {
            tracker,
            tests,
            patterns: KeyPatterns::default(),
        }
    }

    /// Use a non-canonical pattern set.
    pub fn with_patterns(mut self, patterns: KeyPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Reconcile every record of the report. Fails only when the
    /// collection name yields no run-level keys.
    pub async fn reconcile(
        &self,
        report: &TestRunReport,
    ) -> Result<RunSummary, CollectionKeyError> {
        let run_keys = self.patterns.run_keys(&report.collection)?;
        info!(
            collection = %report.collection,
            execution = %run_keys.execution_key,
            set = %run_keys.set_key,
            records = report.executions.len(),
            "reconciling run"
        );

        let mut summary = RunSummary::default();

        for record in &report.executions {
            let keys = match self.patterns.case_keys(&record.name) {
                Some(case) => ParsedKeys::join(&run_keys, case),
                None => {
                    warn!(request = %record.name, "request name has no key token, skipping");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.reconcile_record(&keys, record).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    let chain = format!("{e:#}");
                    error!(
                        case = %keys.case_key,
                        request = %record.name,
                        error = %chain,
                        "record failed, continuing with next"
                    );
                    summary.errored += 1;
                }
            }
        }

        info!(%summary, "run reconciled");
        Ok(summary)
    }

    async fn reconcile_record(
        &self,
        keys: &ParsedKeys,
        record: &ExecutionRecord,
    ) -> anyhow::Result<()> {
        let verdict = Verdict::from_assertions(&record.assertions);

        let case = self.find_or_create_case(keys).await?;

        self.tests.add_test_to_set(&keys.set_key, &case.key).await?;
        self.tests
            .add_test_to_execution(&keys.execution_key, &case.key)
            .await?;

        let comment = failure_detail(record);
        self.tests
            .import_result(&keys.execution_key, &case.key, verdict, comment.as_deref())
            .await?;

        match verdict {
            Verdict::Skipped => {
                debug!(case = %case.key, "no assertions ran, leaving bugs untouched");
            }
            Verdict::Failed => self.ensure_bug_open(keys, &case, record).await?,
            Verdict::Passed => self.ensure_bug_closed(keys).await?,
        }

        info!(case = %case.key, verdict = %verdict, "record reconciled");
        Ok(())
    }

    /// Search-before-create. Existing cases are reused untouched so
    /// manual edits in the tracker survive every run.
    async fn find_or_create_case(&self, keys: &ParsedKeys) -> anyhow::Result<RemoteIssue> {
        if let Some(existing) = self.tracker.find_test_case(&keys.case_key).await? {
            debug!(case = %existing.key, "reusing existing test case");
            return Ok(existing);
        }

        let summary = case_summary(&keys.case_key, &keys.summary);
        let created = self.tracker.create_test_case(&keys.case_key, &summary).await?;
        info!(case = %created.key, summary = %summary, "created test case");
        Ok(created)
    }

    async fn ensure_bug_open(
        &self,
        keys: &ParsedKeys,
        case: &RemoteIssue,
        record: &ExecutionRecord,
    ) -> anyhow::Result<()> {
        match self.tracker.find_bug(&keys.case_key).await? {
            None => {
                let summary = bug_summary(&keys.case_key, &keys.summary);
                let description = bug_description(record);
                let bug = self
                    .tracker
                    .create_bug(&keys.case_key, &summary, &description)
                    .await?;
                self.tracker.link_issues(&bug.key, &case.key).await?;
                info!(bug = %bug.key, case = %case.key, "opened bug");
            }
            Some(bug) if bug.category.is_closed() => {
                self.tracker.reopen_issue(&bug.key).await?;
                info!(bug = %bug.key, "reopened bug");
            }
            Some(bug) => {
                debug!(bug = %bug.key, status = %bug.status, "bug already open");
            }
        }
        Ok(())
    }

    async fn ensure_bug_closed(&self, keys: &ParsedKeys) -> anyhow::Result<()> {
        match self.tracker.find_bug(&keys.case_key).await? {
            Some(bug) if !bug.category.is_closed() => {
                self.tracker.close_issue(&bug.key).await?;
                info!(bug = %bug.key, "closed bug after pass");
            }
            Some(bug) => {
                debug!(bug = %bug.key, "bug already closed");
            }
            None => {}
        }
        Ok(())
    }
}

/// Canonical case summary. The bracketed case key doubles as the
/// idempotency key for search-before-create.
pub fn case_summary(case_key: &str, summary: &str) -> String {
    format!("[{case_key}] {summary}")
}

/// Canonical bug summary for a failing case.
pub fn bug_summary(case_key: &str, summary: &str) -> String {
    format!("[{case_key}] {summary} failed")
}

fn bug_description(record: &ExecutionRecord) -> String {
    let detail = failure_detail(record).unwrap_or_else(|| "assertion failed".to_string());
    format!("{} {} failed: {}", record.method, record.url, detail)
}

fn failure_detail(record: &ExecutionRecord) -> Option<String> {
    record.assertions.iter().find(|a| !a.passed).map(|a| {
        match &a.error {
            Some(error) => format!("{}: {}", a.name, error),
            None => a.name.clone(),
        }
    })
}
