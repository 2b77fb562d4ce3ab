use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::warn;

use super::EngineError;
use crate::formula::{ScoringRule, SuccessFormula};
use crate::{Employee, ScoreValue};

/// Per-variable reference values derived from one benchmark selection.
/// Recomputed whenever the benchmark set changes; read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    values: BTreeMap<String, ScoreValue>,
}

impl Baseline {
    pub fn get(&self, tv_id: &str) -> Option<&ScoreValue> {
        self.values.get(tv_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Derives the baseline for every variable in the formula.
///
/// Numeric and ordinal variables take the median of the benchmark members'
/// values (even counts average the two middle values). Categorical variables
/// take the most frequent category, ties broken by the catalog preference
/// order. Directional variables take the catalog threshold as-is.
///
/// A member missing one variable's value is skipped for that variable; a
/// variable no member has a usable value for gets no baseline and is later
/// excluded from roll-ups.
pub fn compute_baseline(
    formula: &SuccessFormula,
    employees: &[Employee],
    benchmark_ids: &[i64],
) -> Result<Baseline, EngineError> {
    if benchmark_ids.is_empty() {
        return Err(EngineError::EmptyBenchmark);
    }

    let by_id: BTreeMap<i64, &Employee> = employees
        .iter()
        .map(|employee| (employee.employee_id, employee))
        .collect();

    let mut members = Vec::with_capacity(benchmark_ids.len());
    for id in benchmark_ids {
        members.push(*by_id.get(id).ok_or(EngineError::UnknownEmployee(*id))?);
    }

    let mut values = BTreeMap::new();
    for (_, tv) in formula.variables() {
        let value = match &tv.rule {
            ScoringRule::Numeric { .. } | ScoringRule::Ordinal { .. } => {
                numeric_median(&members, &tv.id).map(ScoreValue::Number)
            }
            ScoringRule::Categorical {
                preference_order, ..
            } => categorical_mode(&members, &tv.id, preference_order).map(ScoreValue::Text),
            ScoringRule::Directional { threshold, .. } => Some(ScoreValue::Number(*threshold)),
        };

        match value {
            Some(value) => {
                values.insert(tv.id.clone(), value);
            }
            None => warn!(
                tv_id = %tv.id,
                "no benchmark member has a usable value; variable excluded from roll-ups"
            ),
        }
    }

    Ok(Baseline { values })
}

fn numeric_median(members: &[&Employee], tv_id: &str) -> Option<f64> {
    let mut values: Vec<f64> = members
        .iter()
        .filter_map(|employee| employee.score(tv_id).and_then(ScoreValue::as_number))
        .collect();
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn categorical_mode(members: &[&Employee], tv_id: &str, preference_order: &[String]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for employee in members {
        if let Some(category) = employee.score(tv_id).and_then(ScoreValue::as_text) {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }

    // First-declared category wins a count tie; undeclared categories lose
    // against any declared one.
    let rank = |category: &str| {
        preference_order
            .iter()
            .position(|declared| declared == category)
            .unwrap_or(usize::MAX)
    };

    counts
        .into_iter()
        .max_by(|(a_cat, a_count), (b_cat, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| rank(b_cat).cmp(&rank(a_cat)))
                .then_with(|| b_cat.cmp(a_cat))
        })
        .map(|(category, _)| category.to_string())
}
