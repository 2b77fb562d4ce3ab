use crate::formula::{Direction, ScoringRule, TalentVariable};
use crate::ScoreValue;

/// Match rate for one talent variable, with display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TvScore {
    /// Always within [0, 1].
    pub rate: f64,
    pub status: &'static str,
    pub details: String,
}

/// Scores one variable against the baseline.
///
/// `None` means the variable produced no rate: the user score or baseline is
/// missing, or the stored value has the wrong kind for the rule. Such a
/// variable is excluded from its group's roll-up (weights renormalize over
/// the rest); it is never treated as a zero.
pub fn score_variable(
    tv: &TalentVariable,
    baseline: Option<&ScoreValue>,
    user: Option<&ScoreValue>,
) -> Option<TvScore> {
    let baseline = baseline?;
    let user = user?;

    match &tv.rule {
        ScoringRule::Numeric { tolerance } | ScoringRule::Ordinal { tolerance } => {
            score_numeric(baseline.as_number()?, user.as_number()?, *tolerance)
        }
        ScoringRule::Categorical { .. } => {
            score_categorical(&tv.rule, baseline.as_text()?, user.as_text()?)
        }
        ScoringRule::Directional {
            direction,
            threshold,
            floor,
        } => score_directional(user.as_number()?, *direction, *threshold, *floor),
    }
}

fn score_numeric(baseline: f64, user: f64, tolerance: f64) -> Option<TvScore> {
    let distance = (user - baseline).abs();
    let rate = (1.0 - distance / tolerance).clamp(0.0, 1.0);

    Some(TvScore {
        rate,
        status: status_from_rate(rate),
        details: format!("{user:.2} vs baseline {baseline:.2} (band {tolerance:.2})"),
    })
}

fn score_categorical(rule: &ScoringRule, baseline: &str, user: &str) -> Option<TvScore> {
    if user == baseline {
        return Some(TvScore {
            rate: 1.0,
            status: "PERFECT_MATCH",
            details: format!("matches baseline category {baseline}"),
        });
    }

    let credit = rule.adjacency_credit(baseline, user);
    if credit > 0.0 {
        return Some(TvScore {
            rate: credit,
            status: "PARTIAL_MATCH",
            details: format!("{user} is adjacent to baseline {baseline}"),
        });
    }

    Some(TvScore {
        rate: 0.0,
        status: "MISS",
        details: format!("{user} does not match baseline {baseline}"),
    })
}

fn score_directional(user: f64, direction: Direction, threshold: f64, floor: f64) -> Option<TvScore> {
    let (on_target, rate) = match direction {
        Direction::AtLeast => (
            user >= threshold,
            ((user - floor) / (threshold - floor)).clamp(0.0, 1.0),
        ),
        Direction::AtMost => (
            user <= threshold,
            ((floor - user) / (floor - threshold)).clamp(0.0, 1.0),
        ),
    };

    if on_target {
        return Some(TvScore {
            rate: 1.0,
            status: "PERFECT_MATCH",
            details: format!("{user:.2} meets target {threshold:.2}"),
        });
    }

    Some(TvScore {
        rate,
        status: status_from_rate(rate),
        details: format!("{user:.2} short of target {threshold:.2} (floor {floor:.2})"),
    })
}

fn status_from_rate(rate: f64) -> &'static str {
    if rate >= 0.9 {
        "PERFECT_MATCH"
    } else if rate >= 0.7 {
        "MATCH"
    } else if rate > 0.0 {
        "PARTIAL_MATCH"
    } else {
        "MISS"
    }
}
