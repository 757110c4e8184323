//! Verdict derivation.

use crate::report::AssertionOutcome;

/// Outcome for one executed request, derived from its assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    /// No assertions ran for the request.
    Skipped,
}

impl Verdict {
    /// Derive a verdict. Pure: any failed assertion wins, an empty
    /// assertion list means the request was never actually tested.
    pub fn from_assertions(assertions: &[AssertionOutcome]) -> Self {
        if assertions.is_empty() {
            Self::Skipped
        } else if assertions.iter().any(|a| !a.passed) {
            Self::Failed
        } else {
            Self::Passed
        }
    }

    /// Wire value for execution-result import.
    pub fn as_status(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_status())
    }
}
