//! HTTP clients for the two remote services xraylink talks to.
//!
//! - [`JiraClient`]: issue tracker REST API with basic auth. Implements
//!   `xraylink_core::IssueTracker`.
//! - [`XrayClient`] / [`XraySession`]: test-management API. The client
//!   exchanges client credentials for a bearer token once per run; the
//!   resulting session is read-only and implements
//!   `xraylink_core::TestManagement`.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `XRAYLINK_TRACKER_URL` | Tracker base URL |
//! | `XRAYLINK_TRACKER_USER` | Tracker user (email) |
//! | `XRAYLINK_TRACKER_TOKEN` | Tracker API token |
//! | `XRAYLINK_PROJECT_KEY` | Tracker project key |
//! | `XRAYLINK_BUG_ISSUE_TYPE` | Bug issue-type name (default: `Bug`) |
//! | `XRAYLINK_TEST_ISSUE_TYPE` | Test issue-type name (default: `Test`) |
//! | `XRAYLINK_TM_URL` | Test-management base URL |
//! | `XRAYLINK_TM_CLIENT_ID` | Test-management client id |
//! | `XRAYLINK_TM_CLIENT_SECRET` | Test-management client secret |
//! | `XRAYLINK_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod config;
pub mod error;
pub mod jira;
pub mod xray;

pub(crate) const USER_AGENT_VALUE: &str = concat!("xraylink/", env!("CARGO_PKG_VERSION"));

pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use jira::{Issue, JiraClient, Transition, TransitionIntent};
pub use xray::{XrayClient, XraySession};
