pub mod api;
pub mod db;
pub mod formula;
pub mod logging;
pub mod matching;
pub mod profile;
pub mod run_id;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw score as stored per (employee, talent variable). Numeric variables
/// carry numbers, categorical ones carry category labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl ScoreValue {
    /// Finite number, or None for text values and non-finite garbage.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScoreValue::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScoreValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

// Commonly used data model for the scoring functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub fullname: String,
    pub directorate: Option<String>,
    pub position: Option<String>,
    pub grade: Option<String>,
    /// Raw scores keyed by talent-variable id.
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreValue>,
}

impl Employee {
    pub fn score(&self, tv_id: &str) -> Option<&ScoreValue> {
        self.scores.get(tv_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_value_kinds_do_not_coerce() {
        assert_eq!(ScoreValue::Number(3.5).as_number(), Some(3.5));
        assert_eq!(ScoreValue::Number(f64::NAN).as_number(), None);
        assert_eq!(ScoreValue::Text("Dominant".into()).as_number(), None);
        assert_eq!(ScoreValue::Number(1.0).as_text(), None);
    }

    #[test]
    fn score_value_deserializes_untagged() {
        let number: ScoreValue = serde_json::from_str("118.5").unwrap();
        let text: ScoreValue = serde_json::from_str("\"Steady\"").unwrap();
        assert_eq!(number, ScoreValue::Number(118.5));
        assert_eq!(text, ScoreValue::Text("Steady".into()));
    }
}
