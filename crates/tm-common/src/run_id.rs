//! Process-level run ID for tracking scoring executions.
//!
//! Each process gets a unique ULID at startup. All scoring sessions within
//! the same process share this ID, enabling:
//! - Traceability of which run produced each response
//! - Separate records for different runs (even on the same day)
//!
//! # Example
//! ```
//! use tm_common::run_id;
//!
//! // Get the process-level run ID (same value for entire process lifetime)
//! let id = run_id::get();
//! println!("Current run: {}", id);
//!
//! // Generate a fresh ULID for sub-tasks if needed
//! let vacancy_suffix = run_id::generate();
//! ```

use once_cell::sync::Lazy;
use ulid::Ulid;

/// Process-level run ID, generated once at first access.
static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Returns the process-level run ID.
///
/// This ID is:
/// - Generated once per process (at first call)
/// - Time-ordered (ULIDs sort lexicographically by creation time)
/// - 26 characters, URL-safe
///
/// Use this for `match_run_id` on scoring responses.
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// Generates a fresh ULID.
///
/// Use this when you need a new unique ID for sub-operations
/// (e.g., vacancy ids, batch sub-runs).
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
