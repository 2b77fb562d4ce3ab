use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::baseline::{compute_baseline, Baseline};
use super::rollup::{rollup_employee, EmployeeRollup};
use super::scoring::{score_variable, TvScore};
use super::EngineError;
use crate::formula::{FormulaError, SuccessFormula};
use crate::{Employee, ScoreValue};

/// Optional candidate-pool narrowing by org attributes. Empty filter accepts
/// everyone outside the benchmark set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFilter {
    #[serde(default)]
    pub directorate: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

impl CandidateFilter {
    pub fn is_empty(&self) -> bool {
        self.directorate.is_none() && self.position.is_none() && self.grade.is_none()
    }

    fn accepts(&self, employee: &Employee) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match wanted {
                None => true,
                Some(wanted) => actual.as_deref() == Some(wanted.as_str()),
            }
        }

        field_matches(&self.directorate, &employee.directorate)
            && field_matches(&self.position, &employee.position)
            && field_matches(&self.grade, &employee.grade)
    }
}

/// One output row per (candidate, talent variable). Group and final rates are
/// repeated across the rows of the same group/employee for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResultRow {
    pub employee_id: i64,
    pub fullname: String,
    pub directorate: Option<String>,
    pub position: Option<String>,
    pub grade: Option<String>,
    pub tgv_name: String,
    pub tv_name: String,
    pub baseline_score: Option<ScoreValue>,
    pub user_score: Option<ScoreValue>,
    /// None when the variable was excluded (missing data), not zero.
    pub tv_match_rate: Option<f64>,
    pub tv_status: Option<&'static str>,
    pub tv_details: Option<String>,
    pub tgv_match_rate: Option<f64>,
    pub final_match_rate: f64,
    /// True when any variable or group was excluded for this employee.
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub employee_id: i64,
    pub fullname: String,
    pub final_match_rate: f64,
    pub partial: bool,
}

/// Full scoring output for one benchmark selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub rows: Vec<MatchResultRow>,
    /// Candidates by final rate descending, ties by employee id ascending.
    pub ranking: Vec<RankedCandidate>,
    /// Benchmark members scored against their own baseline, same ordering.
    pub benchmark: Vec<RankedCandidate>,
}

/// Stateless scoring engine bound to one validated formula. Construction
/// rejects catalogs with integrity problems, so scoring never sees them.
pub struct MatchEngine {
    formula: SuccessFormula,
}

struct ScoredCandidate<'e> {
    employee: &'e Employee,
    scores: BTreeMap<String, TvScore>,
    rollup: EmployeeRollup,
    final_rate: f64,
}

impl MatchEngine {
    pub fn new(formula: SuccessFormula) -> Result<Self, FormulaError> {
        formula.validate()?;
        Ok(Self { formula })
    }

    pub fn formula(&self) -> &SuccessFormula {
        &self.formula
    }

    /// Runs one full scoring session: baseline once, then every candidate in
    /// the pool. The candidate pool is every employee outside the benchmark
    /// set, optionally narrowed by `filter`.
    pub fn score_pool(
        &self,
        employees: &[Employee],
        benchmark_ids: &[i64],
        filter: &CandidateFilter,
    ) -> Result<MatchOutcome, EngineError> {
        let baseline = compute_baseline(&self.formula, employees, benchmark_ids)?;
        let benchmark_set: BTreeSet<i64> = benchmark_ids.iter().copied().collect();

        let mut candidates: Vec<ScoredCandidate<'_>> = Vec::new();
        let mut benchmark_members: Vec<ScoredCandidate<'_>> = Vec::new();

        for employee in employees {
            if benchmark_set.contains(&employee.employee_id) {
                if let Some(scored) = self.score_candidate(&baseline, employee) {
                    benchmark_members.push(scored);
                }
                continue;
            }
            if !filter.accepts(employee) {
                continue;
            }
            match self.score_candidate(&baseline, employee) {
                Some(scored) => candidates.push(scored),
                None => warn!(
                    employee_id = employee.employee_id,
                    "no scorable variable; dropped from ranking"
                ),
            }
        }

        sort_candidates(&mut candidates);
        sort_candidates(&mut benchmark_members);

        debug!(
            candidates = candidates.len(),
            benchmark = benchmark_members.len(),
            baseline_variables = baseline.len(),
            "scoring session complete"
        );

        let mut rows = Vec::with_capacity(candidates.len() * self.formula.variable_count());
        for candidate in &candidates {
            self.push_rows(&baseline, candidate, &mut rows);
        }

        Ok(MatchOutcome {
            rows,
            ranking: candidates.iter().map(ranked).collect(),
            benchmark: benchmark_members.iter().map(ranked).collect(),
        })
    }

    fn score_candidate<'e>(
        &self,
        baseline: &Baseline,
        employee: &'e Employee,
    ) -> Option<ScoredCandidate<'e>> {
        let mut scores = BTreeMap::new();
        for (_, tv) in self.formula.variables() {
            if let Some(score) = score_variable(tv, baseline.get(&tv.id), employee.score(&tv.id)) {
                scores.insert(tv.id.clone(), score);
            }
        }

        let rollup = rollup_employee(&self.formula, &scores);
        let final_rate = rollup.final_rate?;

        Some(ScoredCandidate {
            employee,
            scores,
            rollup,
            final_rate,
        })
    }

    fn push_rows(
        &self,
        baseline: &Baseline,
        candidate: &ScoredCandidate<'_>,
        rows: &mut Vec<MatchResultRow>,
    ) {
        let employee = candidate.employee;
        for (group, group_rollup) in self.formula.groups.iter().zip(&candidate.rollup.groups) {
            for tv in &group.variables {
                let score = candidate.scores.get(&tv.id);
                rows.push(MatchResultRow {
                    employee_id: employee.employee_id,
                    fullname: employee.fullname.clone(),
                    directorate: employee.directorate.clone(),
                    position: employee.position.clone(),
                    grade: employee.grade.clone(),
                    tgv_name: group.name.clone(),
                    tv_name: tv.name.clone(),
                    baseline_score: baseline.get(&tv.id).cloned(),
                    user_score: employee.score(&tv.id).cloned(),
                    tv_match_rate: score.map(|s| s.rate),
                    tv_status: score.map(|s| s.status),
                    tv_details: score.map(|s| s.details.clone()),
                    tgv_match_rate: group_rollup.rate,
                    final_match_rate: candidate.final_rate,
                    partial: candidate.rollup.partial,
                });
            }
        }
    }
}

fn sort_candidates(candidates: &mut [ScoredCandidate<'_>]) {
    candidates.sort_by(|a, b| {
        match b
            .final_rate
            .partial_cmp(&a.final_rate)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => a.employee.employee_id.cmp(&b.employee.employee_id),
            other => other,
        }
    });
}

fn ranked(candidate: &ScoredCandidate<'_>) -> RankedCandidate {
    RankedCandidate {
        employee_id: candidate.employee.employee_id,
        fullname: candidate.employee.fullname.clone(),
        final_match_rate: candidate.final_rate,
        partial: candidate.rollup.partial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{
        CategoryAdjacency, ScoringRule, TalentGroupVariable, TalentVariable,
    };

    fn formula() -> SuccessFormula {
        SuccessFormula {
            version: "v1".into(),
            groups: vec![
                TalentGroupVariable {
                    id: "cognitive".into(),
                    name: "Cognitive".into(),
                    weight: 0.6,
                    variables: vec![
                        TalentVariable {
                            id: "iq".into(),
                            name: "IQ".into(),
                            weight: 0.7,
                            rule: ScoringRule::Numeric { tolerance: 40.0 },
                        },
                        TalentVariable {
                            id: "gtq".into(),
                            name: "GTQ".into(),
                            weight: 0.3,
                            rule: ScoringRule::Numeric { tolerance: 20.0 },
                        },
                    ],
                },
                TalentGroupVariable {
                    id: "behavioral".into(),
                    name: "Behavioral".into(),
                    weight: 0.4,
                    variables: vec![TalentVariable {
                        id: "disc".into(),
                        name: "DISC".into(),
                        weight: 1.0,
                        rule: ScoringRule::Categorical {
                            preference_order: vec![
                                "Dominant".into(),
                                "Influential".into(),
                                "Steady".into(),
                            ],
                            adjacency: vec![CategoryAdjacency {
                                from: "Dominant".into(),
                                to: "Influential".into(),
                                credit: 0.5,
                            }],
                        },
                    }],
                },
            ],
        }
    }

    fn employee(id: i64, iq: f64, gtq: f64, disc: &str) -> Employee {
        let mut scores = BTreeMap::new();
        scores.insert("iq".to_string(), ScoreValue::Number(iq));
        scores.insert("gtq".to_string(), ScoreValue::Number(gtq));
        scores.insert("disc".to_string(), ScoreValue::Text(disc.into()));
        Employee {
            employee_id: id,
            fullname: format!("Employee {id}"),
            directorate: Some("Commercial".into()),
            position: Some("Data Analyst".into()),
            grade: Some("III".into()),
            scores,
        }
    }

    #[test]
    fn construction_rejects_invalid_formula() {
        let mut bad = formula();
        bad.groups[0].weight = 0.9;
        assert!(MatchEngine::new(bad).is_err());
    }

    #[test]
    fn worked_scenario_produces_expected_rates() {
        // Benchmark A: IQ=120, GTQ=80, DISC=Dominant.
        // Candidate B: IQ=110, GTQ=80, DISC=Dominant.
        let engine = MatchEngine::new(formula()).unwrap();
        let pool = vec![
            employee(1, 120.0, 80.0, "Dominant"),
            employee(2, 110.0, 80.0, "Dominant"),
        ];

        let outcome = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        assert_eq!(outcome.ranking.len(), 1);
        let final_rate = outcome.ranking[0].final_match_rate;
        assert!((final_rate - 0.895).abs() < 1e-12);

        assert_eq!(outcome.rows.len(), 3);
        let iq_row = &outcome.rows[0];
        assert_eq!(iq_row.tv_name, "IQ");
        assert!((iq_row.tv_match_rate.unwrap() - 0.75).abs() < 1e-12);
        assert!((iq_row.tgv_match_rate.unwrap() - 0.825).abs() < 1e-12);

        let disc_row = &outcome.rows[2];
        assert_eq!(disc_row.tgv_name, "Behavioral");
        assert_eq!(disc_row.tv_match_rate, Some(1.0));
        assert_eq!(disc_row.tgv_match_rate, Some(1.0));
        assert!(!disc_row.partial);
    }

    #[test]
    fn benchmark_member_scores_one_against_own_baseline() {
        let engine = MatchEngine::new(formula()).unwrap();
        let pool = vec![
            employee(1, 117.0, 85.0, "Steady"),
            employee(2, 100.0, 70.0, "Dominant"),
        ];

        let outcome = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        assert_eq!(outcome.benchmark.len(), 1);
        assert_eq!(outcome.benchmark[0].employee_id, 1);
        assert!((outcome.benchmark[0].final_match_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ranking_sorts_by_rate_then_id() {
        let engine = MatchEngine::new(formula()).unwrap();
        let pool = vec![
            employee(1, 120.0, 80.0, "Dominant"),
            // Same scores, so identical final rates; ids break the tie.
            employee(4, 110.0, 80.0, "Dominant"),
            employee(3, 110.0, 80.0, "Dominant"),
            employee(2, 60.0, 40.0, "Steady"),
        ];

        let outcome = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        let ids: Vec<i64> = outcome.ranking.iter().map(|r| r.employee_id).collect();
        assert_eq!(ids, vec![3, 4, 2]);
        assert!(outcome
            .ranking
            .windows(2)
            .all(|w| w[0].final_match_rate >= w[1].final_match_rate));
    }

    #[test]
    fn filter_narrows_candidate_pool() {
        let engine = MatchEngine::new(formula()).unwrap();
        let mut other = employee(3, 110.0, 80.0, "Dominant");
        other.directorate = Some("Operations".into());
        let pool = vec![
            employee(1, 120.0, 80.0, "Dominant"),
            employee(2, 110.0, 80.0, "Dominant"),
            other,
        ];

        let filter = CandidateFilter {
            directorate: Some("Commercial".into()),
            ..CandidateFilter::default()
        };
        let outcome = engine.score_pool(&pool, &[1], &filter).unwrap();

        assert_eq!(outcome.ranking.len(), 1);
        assert_eq!(outcome.ranking[0].employee_id, 2);
    }

    #[test]
    fn missing_variable_marks_rows_partial() {
        let engine = MatchEngine::new(formula()).unwrap();
        let mut gappy = employee(2, 110.0, 80.0, "Dominant");
        gappy.scores.remove("gtq");
        let pool = vec![employee(1, 120.0, 80.0, "Dominant"), gappy];

        let outcome = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        assert!(outcome.rows.iter().all(|row| row.partial));
        let gtq_row = outcome.rows.iter().find(|r| r.tv_name == "GTQ").unwrap();
        assert_eq!(gtq_row.tv_match_rate, None);
        assert_eq!(gtq_row.user_score, None);
        // Cognitive renormalizes onto IQ alone: 0.75; final = 0.75*0.6 + 1.0*0.4.
        assert!((gtq_row.final_match_rate - 0.85).abs() < 1e-12);
    }

    #[test]
    fn candidate_with_nothing_scorable_is_dropped() {
        let engine = MatchEngine::new(formula()).unwrap();
        let blank = Employee {
            employee_id: 2,
            fullname: "Blank".into(),
            ..Employee::default()
        };
        let pool = vec![employee(1, 120.0, 80.0, "Dominant"), blank];

        let outcome = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        assert!(outcome.ranking.is_empty());
        assert!(outcome.rows.is_empty());
    }

    #[test]
    fn repeated_invocations_are_identical() {
        let engine = MatchEngine::new(formula()).unwrap();
        let pool = vec![
            employee(1, 120.0, 80.0, "Dominant"),
            employee(2, 110.0, 75.0, "Influential"),
            employee(3, 95.0, 90.0, "Steady"),
        ];

        let first = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();
        let second = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn all_rates_stay_in_unit_interval() {
        let engine = MatchEngine::new(formula()).unwrap();
        let pool = vec![
            employee(1, 120.0, 80.0, "Dominant"),
            employee(2, 0.0, 0.0, "Steady"),
            employee(3, 200.0, 200.0, "Influential"),
        ];

        let outcome = engine
            .score_pool(&pool, &[1], &CandidateFilter::default())
            .unwrap();

        for row in &outcome.rows {
            if let Some(rate) = row.tv_match_rate {
                assert!((0.0..=1.0).contains(&rate));
            }
            if let Some(rate) = row.tgv_match_rate {
                assert!((0.0..=1.0).contains(&rate));
            }
            assert!((0.0..=1.0).contains(&row.final_match_rate));
        }
    }
}
