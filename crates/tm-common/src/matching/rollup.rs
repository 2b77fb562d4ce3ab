use std::collections::BTreeMap;

use super::scoring::TvScore;
use crate::formula::{SuccessFormula, TalentGroupVariable};

/// Weighted roll-up of one group's variable rates.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRollup {
    pub tgv_id: String,
    /// None when no variable in the group produced a rate.
    pub rate: Option<f64>,
    /// True when at least one variable was excluded from the average.
    pub partial: bool,
}

/// Group rates plus the final rate for one employee.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRollup {
    /// Same order as the formula's groups.
    pub groups: Vec<GroupRollup>,
    /// None when nothing was scorable at all.
    pub final_rate: Option<f64>,
    pub partial: bool,
}

/// Rolls per-variable rates up into group rates and a final rate.
///
/// Both levels are weighted averages renormalized over the entries that
/// actually produced a rate, so a missing variable shifts its weight onto
/// its siblings instead of dragging the group down.
pub fn rollup_employee(formula: &SuccessFormula, scores: &BTreeMap<String, TvScore>) -> EmployeeRollup {
    let groups: Vec<GroupRollup> = formula
        .groups
        .iter()
        .map(|group| rollup_group(group, scores))
        .collect();

    let mut acc = 0.0;
    let mut weight_sum = 0.0;
    for (group, rollup) in formula.groups.iter().zip(&groups) {
        if let Some(rate) = rollup.rate {
            acc += rate * group.weight;
            weight_sum += group.weight;
        }
    }

    let final_rate = (weight_sum > 0.0).then(|| acc / weight_sum);
    let partial = groups
        .iter()
        .any(|group| group.partial || group.rate.is_none());

    EmployeeRollup {
        groups,
        final_rate,
        partial,
    }
}

fn rollup_group(group: &TalentGroupVariable, scores: &BTreeMap<String, TvScore>) -> GroupRollup {
    let mut acc = 0.0;
    let mut weight_sum = 0.0;
    let mut excluded = 0usize;

    for tv in &group.variables {
        match scores.get(&tv.id) {
            Some(score) => {
                acc += score.rate * tv.weight;
                weight_sum += tv.weight;
            }
            None => excluded += 1,
        }
    }

    GroupRollup {
        tgv_id: group.id.clone(),
        rate: (weight_sum > 0.0).then(|| acc / weight_sum),
        partial: excluded > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{ScoringRule, TalentVariable};

    fn tv(id: &str, weight: f64) -> TalentVariable {
        TalentVariable {
            id: id.into(),
            name: id.to_uppercase(),
            weight,
            rule: ScoringRule::Numeric { tolerance: 10.0 },
        }
    }

    fn formula() -> SuccessFormula {
        SuccessFormula {
            version: "v1".into(),
            groups: vec![
                TalentGroupVariable {
                    id: "cognitive".into(),
                    name: "Cognitive".into(),
                    weight: 0.6,
                    variables: vec![tv("iq", 0.7), tv("gtq", 0.3)],
                },
                TalentGroupVariable {
                    id: "behavioral".into(),
                    name: "Behavioral".into(),
                    weight: 0.4,
                    variables: vec![tv("disc", 1.0)],
                },
            ],
        }
    }

    fn score(rate: f64) -> TvScore {
        TvScore {
            rate,
            status: "MATCH",
            details: String::new(),
        }
    }

    #[test]
    fn full_scores_give_plain_weighted_average() {
        let mut scores = BTreeMap::new();
        scores.insert("iq".to_string(), score(0.75));
        scores.insert("gtq".to_string(), score(1.0));
        scores.insert("disc".to_string(), score(1.0));

        let rollup = rollup_employee(&formula(), &scores);
        assert!((rollup.groups[0].rate.unwrap() - 0.825).abs() < 1e-12);
        assert!((rollup.groups[1].rate.unwrap() - 1.0).abs() < 1e-12);
        assert!((rollup.final_rate.unwrap() - 0.895).abs() < 1e-12);
        assert!(!rollup.partial);
    }

    #[test]
    fn missing_variable_renormalizes_group_weights() {
        let mut scores = BTreeMap::new();
        scores.insert("iq".to_string(), score(0.8));
        scores.insert("disc".to_string(), score(1.0));

        let rollup = rollup_employee(&formula(), &scores);
        // gtq missing: cognitive collapses onto iq's weight alone.
        assert!((rollup.groups[0].rate.unwrap() - 0.8).abs() < 1e-12);
        assert!(rollup.groups[0].partial);
        assert!(rollup.partial);
    }

    #[test]
    fn renormalized_rate_equals_reweighted_average() {
        let mut scores = BTreeMap::new();
        scores.insert("iq".to_string(), score(0.6));
        scores.insert("disc".to_string(), score(0.9));

        let rollup = rollup_employee(&formula(), &scores);
        // Weights renormalized to sum to 1 over the present variables.
        let expected = 0.6 * (0.7 / 0.7);
        assert!((rollup.groups[0].rate.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_group_shifts_weight_to_remaining_groups() {
        let mut scores = BTreeMap::new();
        scores.insert("disc".to_string(), score(0.9));

        let rollup = rollup_employee(&formula(), &scores);
        assert_eq!(rollup.groups[0].rate, None);
        assert!((rollup.final_rate.unwrap() - 0.9).abs() < 1e-12);
        assert!(rollup.partial);
    }

    #[test]
    fn nothing_scorable_gives_no_final_rate() {
        let rollup = rollup_employee(&formula(), &BTreeMap::new());
        assert_eq!(rollup.final_rate, None);
        assert!(rollup.partial);
    }

    #[test]
    fn rates_stay_in_unit_interval() {
        let mut scores = BTreeMap::new();
        scores.insert("iq".to_string(), score(1.0));
        scores.insert("gtq".to_string(), score(0.0));
        scores.insert("disc".to_string(), score(1.0));

        let rollup = rollup_employee(&formula(), &scores);
        for group in &rollup.groups {
            let rate = group.rate.unwrap();
            assert!((0.0..=1.0).contains(&rate));
        }
        let final_rate = rollup.final_rate.unwrap();
        assert!((0.0..=1.0).contains(&final_rate));
    }
}
