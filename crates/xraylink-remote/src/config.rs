//! Runtime configuration for the remote clients.

use crate::error::{RemoteError, RemoteResult};

fn default_timeout() -> u64 {
    30
}

/// Configuration for both remote services, one instance per run.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Tracker base URL, e.g. `https://company.atlassian.net`.
    pub tracker_url: String,

    /// Tracker user (email for cloud instances).
    pub tracker_user: String,

    /// Tracker API token.
    pub tracker_token: String,

    /// Project key test cases and bugs are created under.
    pub project_key: String,

    /// Issue-type name for bugs.
    pub bug_issue_type: String,

    /// Issue-type name for test cases.
    pub test_issue_type: String,

    /// Test-management base URL.
    pub tm_url: String,

    /// Test-management client id.
    pub tm_client_id: String,

    /// Test-management client secret.
    pub tm_client_secret: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Read configuration from `XRAYLINK_*` environment variables.
    /// Missing credentials fail fast here, before any remote call.
    pub fn from_env() -> RemoteResult<Self> {
        Ok(Self {
            tracker_url: require("XRAYLINK_TRACKER_URL")?,
            tracker_user: require("XRAYLINK_TRACKER_USER")?,
            tracker_token: require("XRAYLINK_TRACKER_TOKEN")?,
            project_key: require("XRAYLINK_PROJECT_KEY")?,
            bug_issue_type: optional("XRAYLINK_BUG_ISSUE_TYPE", "Bug"),
            test_issue_type: optional("XRAYLINK_TEST_ISSUE_TYPE", "Test"),
            tm_url: require("XRAYLINK_TM_URL")?,
            tm_client_id: require("XRAYLINK_TM_CLIENT_ID")?,
            tm_client_secret: require("XRAYLINK_TM_CLIENT_SECRET")?,
            timeout_secs: std::env::var("XRAYLINK_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
        })
    }

    /// A config with placeholder credentials, for tests.
    pub fn for_tests() -> Self {
        Self {
            tracker_url: "http://tracker.invalid".to_string(),
            tracker_user: "user".to_string(),
            tracker_token: "token".to_string(),
            project_key: "PROJ".to_string(),
            bug_issue_type: "Bug".to_string(),
            test_issue_type: "Test".to_string(),
            tm_url: "http://tm.invalid".to_string(),
            tm_client_id: "client-id".to_string(),
            tm_client_secret: "client-secret".to_string(),
            timeout_secs: default_timeout(),
        }
    }

    /// Set the tracker base URL.
    pub fn with_tracker_url(mut self, url: impl Into<String>) -> Self {
        self.tracker_url = url.into();
        self
    }

    /// Set the test-management base URL.
    pub fn with_tm_url(mut self, url: impl Into<String>) -> Self {
        self.tm_url = url.into();
        self
    }

    /// Set the project key.
    pub fn with_project_key(mut self, key: impl Into<String>) -> Self {
        self.project_key = key.into();
        self
    }
}

fn require(var: &str) -> RemoteResult<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RemoteError::Config {
            message: format!("{var} is not set"),
        }),
    }
}

fn optional(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[(&str, &str)] = &[
        ("XRAYLINK_TRACKER_URL", "https://tracker.example.com"),
        ("XRAYLINK_TRACKER_USER", "ci@example.com"),
        ("XRAYLINK_TRACKER_TOKEN", "tok"),
        ("XRAYLINK_PROJECT_KEY", "PROJ"),
        ("XRAYLINK_TM_URL", "https://tm.example.com"),
        ("XRAYLINK_TM_CLIENT_ID", "id"),
        ("XRAYLINK_TM_CLIENT_SECRET", "secret"),
    ];

    fn clear_env() {
        for (var, _) in ALL_VARS {
            std::env::remove_var(var);
        }
        std::env::remove_var("XRAYLINK_BUG_ISSUE_TYPE");
        std::env::remove_var("XRAYLINK_TEST_ISSUE_TYPE");
        std::env::remove_var("XRAYLINK_TIMEOUT");
    }

    #[test]
    #[serial]
    fn from_env_reads_all_variables() {
        clear_env();
        for (var, value) in ALL_VARS {
            std::env::set_var(var, value);
        }
        std::env::set_var("XRAYLINK_TIMEOUT", "5");

        let config = RemoteConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.tracker_url, "https://tracker.example.com");
        assert_eq!(config.project_key, "PROJ");
        assert_eq!(config.bug_issue_type, "Bug");
        assert_eq!(config.test_issue_type, "Test");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    #[serial]
    fn missing_credential_is_a_config_error() {
        clear_env();
        for (var, value) in ALL_VARS {
            std::env::set_var(var, value);
        }
        std::env::remove_var("XRAYLINK_TM_CLIENT_SECRET");

        let err = RemoteConfig::from_env().unwrap_err();
        clear_env();

        assert!(matches!(err, RemoteError::Config { .. }));
        assert!(err.to_string().contains("XRAYLINK_TM_CLIENT_SECRET"));
    }

    #[test]
    #[serial]
    fn empty_value_counts_as_missing() {
        clear_env();
        for (var, value) in ALL_VARS {
            std::env::set_var(var, value);
        }
        std::env::set_var("XRAYLINK_TRACKER_TOKEN", "  ");

        let err = RemoteConfig::from_env().unwrap_err();
        clear_env();

        assert!(err.to_string().contains("XRAYLINK_TRACKER_TOKEN"));
    }

    #[test]
    #[serial]
    fn issue_type_overrides_are_honored() {
        clear_env();
        for (var, value) in ALL_VARS {
            std::env::set_var(var, value);
        }
        std::env::set_var("XRAYLINK_BUG_ISSUE_TYPE", "Defect");

        let config = RemoteConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.bug_issue_type, "Defect");
    }
}
