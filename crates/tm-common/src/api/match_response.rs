use serde::Serialize;

use crate::matching::{MatchOutcome, MatchResultRow, RankedCandidate};

/// Dashboard-facing scoring response: the full row table plus the ranked
/// summary and session analytics.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    /// Recorded vacancy id when role context was supplied.
    pub vacancy_id: Option<String>,
    /// Process run id, for tracing a response back to its run.
    pub match_run_id: String,
    pub formula_version: String,
    pub rows: Vec<MatchResultRow>,
    pub ranking: Vec<RankedCandidate>,
    pub analytics: MatchAnalytics,
}

impl MatchResponse {
    /// Shapes an engine outcome for the dashboard, applying the candidate
    /// limit after analytics so averages reflect the whole pool.
    pub fn from_outcome(
        outcome: MatchOutcome,
        formula_version: String,
        vacancy_id: Option<String>,
        match_run_id: String,
        limit: usize,
        config: &MatchConfig,
    ) -> Self {
        let analytics = MatchAnalytics::from_outcome(&outcome, config);

        let MatchOutcome { rows, ranking, .. } = outcome;
        let ranking: Vec<RankedCandidate> = ranking.into_iter().take(limit).collect();
        let rows: Vec<MatchResultRow> = rows
            .into_iter()
            .filter(|row| {
                ranking
                    .iter()
                    .any(|candidate| candidate.employee_id == row.employee_id)
            })
            .collect();

        Self {
            vacancy_id,
            match_run_id,
            formula_version,
            rows,
            ranking,
            analytics,
        }
    }
}

/// Summary block for the dashboard's overview metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchAnalytics {
    /// Average final rate across all candidates; None for an empty pool.
    pub avg_match_rate: Option<f64>,
    /// Average final rate of the benchmark members against their baseline.
    pub benchmark_avg: Option<f64>,
    /// Candidates at or above the top-talent threshold.
    pub top_talent_count: usize,
}

impl MatchAnalytics {
    pub fn from_outcome(outcome: &MatchOutcome, config: &MatchConfig) -> Self {
        Self {
            avg_match_rate: mean(&outcome.ranking),
            benchmark_avg: mean(&outcome.benchmark),
            top_talent_count: outcome
                .ranking
                .iter()
                .filter(|candidate| candidate.final_match_rate >= config.top_talent_threshold)
                .count(),
        }
    }
}

fn mean(candidates: &[RankedCandidate]) -> Option<f64> {
    if candidates.is_empty() {
        return None;
    }
    let sum: f64 = candidates
        .iter()
        .map(|candidate| candidate.final_match_rate)
        .sum();
    Some(sum / candidates.len() as f64)
}

/// Presentation tunables, loaded from the environment.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Final-rate threshold counted as top talent (default 0.8).
    pub top_talent_threshold: f64,
    /// Ranked-list cap applied when a request carries no limit.
    pub default_limit: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            top_talent_threshold: 0.8,
            default_limit: 50,
        }
    }
}

impl MatchConfig {
    pub fn from_env() -> Self {
        Self {
            top_talent_threshold: std::env::var("TM_TOP_TALENT_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.8),
            default_limit: std::env::var("TM_MATCH_DEFAULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
        }
    }
}
