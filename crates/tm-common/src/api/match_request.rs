use serde::Deserialize;

use crate::matching::CandidateFilter;

/// Scoring request from the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    /// Ideal-performer references for this session. Must be non-empty.
    pub benchmark_ids: Vec<i64>,
    /// Pinned formula version; latest when omitted.
    #[serde(default)]
    pub formula_version: Option<String>,
    #[serde(default)]
    pub filter: CandidateFilter,
    /// Caps the ranked candidate list (and the rows emitted for it).
    #[serde(default)]
    pub limit: Option<usize>,

    // Role context, recorded with the vacancy when present.
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub job_level: Option<String>,
    #[serde(default)]
    pub role_purpose: Option<String>,
}
