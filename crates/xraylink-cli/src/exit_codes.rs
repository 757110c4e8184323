//! Unified exit codes. These are part of the CI contract: the
//! pipeline step keys its own pass/fail decision on them.

/// Run completed, every record reconciled or skipped with a warning.
pub const SUCCESS: i32 = 0;

/// Report missing, malformed, or without usable run-level keys.
pub const REPORT_ERROR: i32 = 1;

/// Credential exchange or tracker authentication failed at startup.
pub const AUTH_ERROR: i32 = 2;

/// Run completed but one or more records hit a remote failure.
pub const PARTIAL: i32 = 3;
