//! Core logic for syncing CI test-run reports into an issue tracker.
//!
//! This crate is deliberately free of HTTP concerns. It provides:
//!
//! - Loading a Postman-CLI style JSON run report ([`report`])
//! - Extracting tracker keys from naming conventions ([`keys`])
//! - Deriving a pass/fail/skip verdict per request ([`verdict`])
//! - The reconciler that diffs verdicts against remote tracker state
//!   and issues the minimal set of operations ([`reconcile`])
//!
//! Remote services are abstracted behind the [`remote::IssueTracker`]
//! and [`remote::TestManagement`] traits; concrete clients live in
//! `xraylink-remote`.

pub mod keys;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod verdict;

pub use keys::{CaseKeys, CollectionKeyError, KeyPatterns, ParsedKeys, RunKeys};
pub use reconcile::{Reconciler, RunSummary};
pub use remote::{IssueTracker, RemoteIssue, StatusCategory, TestManagement};
pub use report::{AssertionOutcome, ExecutionRecord, ReportError, TestRunReport};
pub use verdict::Verdict;
