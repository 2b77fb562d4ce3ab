pub mod baseline;
pub mod pipeline;
pub mod rollup;
pub mod scoring;

pub use baseline::{compute_baseline, Baseline};
pub use pipeline::{
    CandidateFilter, MatchEngine, MatchOutcome, MatchResultRow, RankedCandidate,
};
pub use rollup::{rollup_employee, EmployeeRollup, GroupRollup};
pub use scoring::{score_variable, TvScore};

use thiserror::Error;

/// Request-level engine failures. Per-variable gaps are not errors; they are
/// recovered through renormalization and surfaced via the partial flag.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("benchmark set is empty")]
    EmptyBenchmark,
    #[error("benchmark employee {0} has no score record")]
    UnknownEmployee(i64),
}
