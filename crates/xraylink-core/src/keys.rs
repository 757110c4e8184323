//! Key extraction from naming conventions.
//!
//! Collection names carry the run-level keys as two bracket tokens
//! (`[TE-01][TS-01] Suite`); request names carry one combined token
//! whose first segment is the case key (`[API01-TS01-TE01] Get list`).
//! The trailing segments of the combined token are echoes of the
//! run-level keys and are ignored for linking. First match wins; a
//! name that does not match yields no keys, never a partial set.

use regex::Regex;

/// Run-level execution key pattern (collection name).
pub const EXECUTION_KEY_PATTERN: &str = r"\[(TE-\d+)\]";

/// Run-level set key pattern (collection name).
pub const SET_KEY_PATTERN: &str = r"\[(TS-\d+)\]";

/// Combined case-key pattern (request name). Captures the case key
/// and the human-readable summary after the token.
pub const CASE_KEY_PATTERN: &str = r"^\[([A-Za-z]+\d+)-TS\d+-TE\d+\]\s*(.+)$";

/// The collection name did not yield execution and set keys; nothing
/// in the run could be linked or submitted.
#[derive(Debug, thiserror::Error)]
#[error("collection name {name:?} does not contain [TE-n][TS-n] keys")]
pub struct CollectionKeyError {
    pub name: String,
}

/// Keys extracted from the collection name, shared by every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunKeys {
    /// Test-execution key, e.g. `TE-01`.
    pub execution_key: String,

    /// Test-set key, e.g. `TS-01`.
    pub set_key: String,
}

/// Keys extracted from a request name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseKeys {
    /// Logical case key, e.g. `API01`.
    pub case_key: String,

    /// Request summary after the bracket token.
    pub summary: String,
}

/// The full key set for one record, run-level and record-level combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeys {
    pub execution_key: String,
    pub set_key: String,
    pub case_key: String,
    pub summary: String,
}

impl ParsedKeys {
    /// Combine run-level and record-level keys.
    pub fn join(run: &RunKeys, case: CaseKeys) -> Self {
        Self {
            execution_key: run.execution_key.clone(),
            set_key: run.set_key.clone(),
            case_key: case.case_key,
            summary: case.summary,
        }
    }
}

/// Compiled pattern set applied to collection and request names.
#[derive(Debug, Clone)]
pub struct KeyPatterns {
    execution: Regex,
    set: Regex,
    case: Regex,
}

impl KeyPatterns {
    /// Build a pattern set from custom patterns. The case pattern must
    /// capture the case key in group 1 and the summary in group 2.
    pub fn new(execution: &str, set: &str, case: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            execution: Regex::new(execution)?,
            set: Regex::new(set)?,
            case: Regex::new(case)?,
        })
    }

    /// Extract run-level keys from a collection name.
    pub fn run_keys(&self, collection_name: &str) -> Result<RunKeys, CollectionKeyError> {
        let execution_key = first_capture(&self.execution, collection_name);
        let set_key = first_capture(&self.set, collection_name);

        match (execution_key, set_key) {
            (Some(execution_key), Some(set_key)) => Ok(RunKeys {
                execution_key,
                set_key,
            }),
            _ => Err(CollectionKeyError {
                name: collection_name.to_string(),
            }),
        }
    }

    /// Extract the case key and summary from a request name. `None`
    /// means the record should be skipped with a warning.
    pub fn case_keys(&self, request_name: &str) -> Option<CaseKeys> {
        let captures = self.case.captures(request_name)?;
        Some(CaseKeys {
            case_key: captures.get(1)?.as_str().to_string(),
            summary: captures.get(2)?.as_str().trim().to_string(),
        })
    }
}

impl Default for KeyPatterns {
    fn default() -> Self {
        Self::new(EXECUTION_KEY_PATTERN, SET_KEY_PATTERN, CASE_KEY_PATTERN)
            .expect("canonical key patterns compile")
    }
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_run_keys_from_collection_name() {
        let patterns = KeyPatterns::default();
        let keys = patterns.run_keys("[TE-01][TS-01] Orders API").unwrap();
        assert_eq!(keys.execution_key, "TE-01");
        assert_eq!(keys.set_key, "TS-01");
    }

    #[test]
    fn run_keys_order_in_name_does_not_matter() {
        let patterns = KeyPatterns::default();
        let keys = patterns.run_keys("smoke [TS-07] suite [TE-12]").unwrap();
        assert_eq!(keys.execution_key, "TE-12");
        assert_eq!(keys.set_key, "TS-07");
    }

    #[test]
    fn first_match_wins_for_run_keys() {
        let patterns = KeyPatterns::default();
        let keys = patterns.run_keys("[TE-01][TE-99][TS-01] dup").unwrap();
        assert_eq!(keys.execution_key, "TE-01");
    }

    #[test]
    fn collection_without_keys_is_an_error() {
        let patterns = KeyPatterns::default();
        let err = patterns.run_keys("Orders API").unwrap_err();
        assert!(err.to_string().contains("Orders API"));
    }

    #[test]
    fn missing_set_key_is_not_a_partial_match() {
        let patterns = KeyPatterns::default();
        assert!(patterns.run_keys("[TE-01] Orders API").is_err());
    }

    #[test]
    fn extracts_case_keys_from_request_name() {
        let patterns = KeyPatterns::default();
        let keys = patterns.case_keys("[API01-TS01-TE01] Get list").unwrap();
        assert_eq!(keys.case_key, "API01");
        assert_eq!(keys.summary, "Get list");
    }

    #[test]
    fn unmatched_request_name_yields_none() {
        let patterns = KeyPatterns::default();
        assert!(patterns.case_keys("Get list").is_none());
        // Token must lead the name.
        assert!(patterns.case_keys("Get list [API01-TS01-TE01]").is_none());
        // Echo segments are required; a bare case token is not enough.
        assert!(patterns.case_keys("[API01] Get list").is_none());
    }

    #[test]
    fn custom_patterns_are_honored() {
        let patterns = KeyPatterns::new(
            r"exec=(\w+)",
            r"set=(\w+)",
            r"^case=(\w+)\s+(.+)$",
        )
        .unwrap();

        let run = patterns.run_keys("exec=E1 set=S1 nightly").unwrap();
        assert_eq!(run.execution_key, "E1");

        let case = patterns.case_keys("case=C9 list orders").unwrap();
        assert_eq!(case.case_key, "C9");
        assert_eq!(case.summary, "list orders");
    }

    #[test]
    fn join_combines_run_and_case_keys() {
        let run = RunKeys {
            execution_key: "TE-01".into(),
            set_key: "TS-01".into(),
        };
        let case = CaseKeys {
            case_key: "API01".into(),
            summary: "Get list".into(),
        };
        let parsed = ParsedKeys::join(&run, case);
        assert_eq!(parsed.execution_key, "TE-01");
        assert_eq!(parsed.set_key, "TS-01");
        assert_eq!(parsed.case_key, "API01");
        assert_eq!(parsed.summary, "Get list");
    }
}
