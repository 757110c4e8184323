//! Error types for the remote clients.

/// Remote-service errors.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Configuration missing or invalid.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Credentials rejected or token invalid.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Non-2xx response from either service.
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// 2xx response that could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The workflow offers no transition matching the intent.
    #[error("no transition towards {target} available on {issue}")]
    NoTransition { issue: String, target: String },
}

impl RemoteError {
    /// Exit code for the CLI. Part of the CI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,
            Self::Unauthorized { .. } => 2,
            Self::Api { .. }
            | Self::Network { .. }
            | Self::InvalidResponse { .. }
            | Self::NoTransition { .. } => 3,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_ci_contract() {
        let config = RemoteError::Config {
            message: "missing".into(),
        };
        assert_eq!(config.exit_code(), 1);

        let auth = RemoteError::Unauthorized {
            message: "denied".into(),
        };
        assert_eq!(auth.exit_code(), 2);

        let api = RemoteError::Api {
            status: 500,
            body: "oops".into(),
        };
        assert_eq!(api.exit_code(), 3);
    }

    #[test]
    fn api_error_carries_status_and_body() {
        let err = RemoteError::Api {
            status: 404,
            body: "issue does not exist".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404: issue does not exist");
    }
}
