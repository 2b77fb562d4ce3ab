//! Success-formula catalog: talent variables grouped into weighted talent
//! group variables. A formula is a versioned, serde-loadable document;
//! integrity problems are fatal at load time, before any scoring happens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance applied to both weight-sum checks.
pub const WEIGHT_EPSILON: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("success formula declares no groups")]
    Empty,
    #[error("group {0} declares no variables")]
    EmptyGroup(String),
    #[error("talent variable {0} appears in more than one group")]
    DuplicateVariable(String),
    #[error("weight for {0} must be a finite non-negative number")]
    InvalidWeight(String),
    #[error("group weights sum to {actual}, expected 1.0")]
    GroupWeightSum { actual: f64 },
    #[error("variable weights in group {group} sum to {actual}, expected 1.0")]
    VariableWeightSum { group: String, actual: f64 },
    #[error("numeric tolerance for {0} must be a positive finite number")]
    InvalidTolerance(String),
    #[error("categorical variable {0} declares no preference order")]
    EmptyPreferenceOrder(String),
    #[error("adjacency pair {from}/{to} on {variable} references an undeclared category")]
    UnknownAdjacencyCategory {
        variable: String,
        from: String,
        to: String,
    },
    #[error("adjacency credit {credit} on {variable} is outside [0, 1]")]
    InvalidAdjacencyCredit { variable: String, credit: f64 },
    #[error("directional floor {floor} on {variable} must lie on the falloff side of threshold {threshold}")]
    InvalidFloor {
        variable: String,
        floor: f64,
        threshold: f64,
    },
}

/// Side of the threshold a directional variable rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AtLeast,
    AtMost,
}

/// Partial credit for a near-miss categorical answer. Pairs are
/// direction-insensitive: (a, b) also covers (b, a).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAdjacency {
    pub from: String,
    pub to: String,
    pub credit: f64,
}

/// Scoring rule attached to a talent variable, tagged by data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", rename_all = "snake_case")]
pub enum ScoringRule {
    Numeric {
        tolerance: f64,
    },
    Ordinal {
        tolerance: f64,
    },
    Categorical {
        preference_order: Vec<String>,
        #[serde(default)]
        adjacency: Vec<CategoryAdjacency>,
    },
    Directional {
        direction: Direction,
        threshold: f64,
        floor: f64,
    },
}

impl ScoringRule {
    /// Partial credit for a non-exact categorical answer, 0.0 when the pair
    /// is not in the adjacency table or the rule is not categorical.
    pub fn adjacency_credit(&self, baseline: &str, user: &str) -> f64 {
        match self {
            ScoringRule::Categorical { adjacency, .. } => adjacency
                .iter()
                .find(|pair| {
                    (pair.from == baseline && pair.to == user)
                        || (pair.from == user && pair.to == baseline)
                })
                .map(|pair| pair.credit)
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentVariable {
    pub id: String,
    pub name: String,
    /// Intra-group weight; weights sum to 1 within each group.
    pub weight: f64,
    #[serde(flatten)]
    pub rule: ScoringRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentGroupVariable {
    pub id: String,
    pub name: String,
    /// Inter-group weight; weights sum to 1 across the formula.
    pub weight: f64,
    /// Declaration order is preserved; it drives output row order.
    pub variables: Vec<TalentVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessFormula {
    pub version: String,
    pub groups: Vec<TalentGroupVariable>,
}

impl SuccessFormula {
    /// All (group, variable) pairs in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (&TalentGroupVariable, &TalentVariable)> {
        self.groups
            .iter()
            .flat_map(|group| group.variables.iter().map(move |tv| (group, tv)))
    }

    pub fn variable_count(&self) -> usize {
        self.groups.iter().map(|group| group.variables.len()).sum()
    }

    /// Catalog-integrity checks. Run once at load; an invalid formula must
    /// never reach the scoring pipeline.
    pub fn validate(&self) -> Result<(), FormulaError> {
        if self.groups.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut seen_ids: Vec<&str> = Vec::with_capacity(self.variable_count());

        let mut group_weight_sum = 0.0;
        for group in &self.groups {
            if group.variables.is_empty() {
                return Err(FormulaError::EmptyGroup(group.id.clone()));
            }
            if !group.weight.is_finite() || group.weight < 0.0 {
                return Err(FormulaError::InvalidWeight(group.id.clone()));
            }
            group_weight_sum += group.weight;

            let mut variable_weight_sum = 0.0;
            for tv in &group.variables {
                if seen_ids.contains(&tv.id.as_str()) {
                    return Err(FormulaError::DuplicateVariable(tv.id.clone()));
                }
                seen_ids.push(&tv.id);

                if !tv.weight.is_finite() || tv.weight < 0.0 {
                    return Err(FormulaError::InvalidWeight(tv.id.clone()));
                }
                variable_weight_sum += tv.weight;

                validate_rule(tv)?;
            }

            if (variable_weight_sum - 1.0).abs() > WEIGHT_EPSILON {
                return Err(FormulaError::VariableWeightSum {
                    group: group.id.clone(),
                    actual: variable_weight_sum,
                });
            }
        }

        if (group_weight_sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(FormulaError::GroupWeightSum {
                actual: group_weight_sum,
            });
        }

        Ok(())
    }
}

fn validate_rule(tv: &TalentVariable) -> Result<(), FormulaError> {
    match &tv.rule {
        ScoringRule::Numeric { tolerance } | ScoringRule::Ordinal { tolerance } => {
            if !tolerance.is_finite() || *tolerance <= 0.0 {
                return Err(FormulaError::InvalidTolerance(tv.id.clone()));
            }
        }
        ScoringRule::Categorical {
            preference_order,
            adjacency,
        } => {
            if preference_order.is_empty() {
                return Err(FormulaError::EmptyPreferenceOrder(tv.id.clone()));
            }
            for pair in adjacency {
                if !(0.0..=1.0).contains(&pair.credit) || !pair.credit.is_finite() {
                    return Err(FormulaError::InvalidAdjacencyCredit {
                        variable: tv.id.clone(),
                        credit: pair.credit,
                    });
                }
                if !preference_order.contains(&pair.from) || !preference_order.contains(&pair.to) {
                    return Err(FormulaError::UnknownAdjacencyCategory {
                        variable: tv.id.clone(),
                        from: pair.from.clone(),
                        to: pair.to.clone(),
                    });
                }
            }
        }
        ScoringRule::Directional {
            direction,
            threshold,
            floor,
        } => {
            if !threshold.is_finite() || !floor.is_finite() {
                return Err(FormulaError::InvalidFloor {
                    variable: tv.id.clone(),
                    floor: *floor,
                    threshold: *threshold,
                });
            }
            let floor_ok = match direction {
                Direction::AtLeast => floor < threshold,
                Direction::AtMost => floor > threshold,
            };
            if !floor_ok {
                return Err(FormulaError::InvalidFloor {
                    variable: tv.id.clone(),
                    floor: *floor,
                    threshold: *threshold,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_tv(id: &str, weight: f64, tolerance: f64) -> TalentVariable {
        TalentVariable {
            id: id.into(),
            name: id.to_uppercase(),
            weight,
            rule: ScoringRule::Numeric { tolerance },
        }
    }

    fn valid_formula() -> SuccessFormula {
        SuccessFormula {
            version: "v1".into(),
            groups: vec![
                TalentGroupVariable {
                    id: "cognitive".into(),
                    name: "Cognitive".into(),
                    weight: 0.6,
                    variables: vec![numeric_tv("iq", 0.7, 40.0), numeric_tv("gtq", 0.3, 20.0)],
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

    #[test]
    fn accepts_weights_summing_to_one() {
        assert!(valid_formula().validate().is_ok());
    }

    #[test]
    fn accepts_weights_within_epsilon() {
        let mut formula = valid_formula();
        formula.groups[0].weight = 0.6 + 5e-7;
        assert!(formula.validate().is_ok());
    }

    #[test]
    fn rejects_group_weight_drift() {
        let mut formula = valid_formula();
        formula.groups[0].weight = 0.7;
        assert!(matches!(
            formula.validate(),
            Err(FormulaError::GroupWeightSum { .. })
        ));
    }

    #[test]
    fn rejects_variable_weight_drift() {
        let mut formula = valid_formula();
        formula.groups[0].variables[0].weight = 0.8;
        match formula.validate() {
            Err(FormulaError::VariableWeightSum { group, .. }) => assert_eq!(group, "cognitive"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_variable_claimed_by_two_groups() {
        let mut formula = valid_formula();
        formula.groups[1].variables[0].id = "iq".into();
        assert!(matches!(
            formula.validate(),
            Err(FormulaError::DuplicateVariable(id)) if id == "iq"
        ));
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let mut formula = valid_formula();
        formula.groups[0].variables[0].rule = ScoringRule::Numeric { tolerance: 0.0 };
        assert!(matches!(
            formula.validate(),
            Err(FormulaError::InvalidTolerance(id)) if id == "iq"
        ));
    }

    #[test]
    fn rejects_adjacency_outside_preference_order() {
        let mut formula = valid_formula();
        if let ScoringRule::Categorical { adjacency, .. } = &mut formula.groups[1].variables[0].rule
        {
            adjacency.push(CategoryAdjacency {
                from: "Dominant".into(),
                to: "Compliant".into(),
                credit: 0.3,
            });
        }
        assert!(matches!(
            formula.validate(),
            Err(FormulaError::UnknownAdjacencyCategory { .. })
        ));
    }

    #[test]
    fn rejects_floor_on_wrong_side() {
        let mut formula = valid_formula();
        formula.groups[0].variables[0].rule = ScoringRule::Directional {
            direction: Direction::AtLeast,
            threshold: 50.0,
            floor: 60.0,
        };
        assert!(matches!(
            formula.validate(),
            Err(FormulaError::InvalidFloor { .. })
        ));
    }

    #[test]
    fn adjacency_credit_is_symmetric() {
        let formula = valid_formula();
        let rule = &formula.groups[1].variables[0].rule;
        assert_eq!(rule.adjacency_credit("Dominant", "Influential"), 0.5);
        assert_eq!(rule.adjacency_credit("Influential", "Dominant"), 0.5);
        assert_eq!(rule.adjacency_credit("Dominant", "Steady"), 0.0);
    }

    #[test]
    fn round_trips_through_json() {
        let formula = valid_formula();
        let json = serde_json::to_value(&formula).unwrap();
        assert_eq!(json["groups"][0]["variables"][0]["data_type"], "numeric");
        let decoded: SuccessFormula = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, formula);
    }
}
