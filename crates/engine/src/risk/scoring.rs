//! Score-based risk check.
//!
//! The evaluator only asks for a number in `[0, 1]`; anything implementing
//! [`RiskScorer`] can replace the built-in heuristic without touching the
//! rule order.

use crate::{Amount, Candidate};

use super::RiskContext;

pub trait RiskScorer: Send + Sync {
    fn score(&self, candidate: &Candidate, context: &RiskContext) -> f64;
}

/// Additive heuristic used until a trained model exists.
#[derive(Clone, Debug, PartialEq)]
pub struct HeuristicScorer {
    /// Added for `FAVOR_GIFT` and `LABOR_SERVICE`.
    pub favor_weight: f64,
    /// Added when the human value is above `high_value_threshold`.
    pub high_value_weight: f64,
    pub high_value_threshold: Amount,
    /// Added when the description has fewer than `min_description_chars`
    /// characters.
    pub short_description_weight: f64,
    pub min_description_chars: usize,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self {
            favor_weight: 0.2,
            high_value_weight: 0.3,
            high_value_threshold: Amount::from_major(10_000),
            short_description_weight: 0.2,
            min_description_chars: 10,
        }
    }
}

impl RiskScorer for HeuristicScorer {
    fn score(&self, candidate: &Candidate, _context: &RiskContext) -> f64 {
        let mut score = 0.0;
        if candidate.kind.is_favor() {
            score += self.favor_weight;
        }
        if candidate.human_value_amount > self.high_value_threshold {
            score += self.high_value_weight;
        }
        if candidate.description.chars().count() < self.min_description_chars {
            score += self.short_description_weight;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::TransactionKind;

    fn candidate(kind: TransactionKind, human: i64, description: &str) -> Candidate {
        Candidate {
            from_user_id: "u1".to_string(),
            to_user_id: "u2".to_string(),
            kind,
            monetary_amount: Amount::from_major(200),
            human_value_amount: Amount::from_major(human),
            description: description.to_string(),
        }
    }

    fn context() -> RiskContext {
        RiskContext::empty(Utc::now())
    }

    #[test]
    fn plain_sale_scores_zero() {
        let score = HeuristicScorer::default().score(
            &candidate(TransactionKind::PhysicalSale, 0, "used desk lamp, works fine"),
            &context(),
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn weights_add_up() {
        let scorer = HeuristicScorer::default();
        let favor = scorer.score(
            &candidate(TransactionKind::FavorGift, 50, "help moving boxes"),
            &context(),
        );
        assert!((favor - 0.2).abs() < 1e-9);

        let all = scorer.score(
            &candidate(TransactionKind::LaborService, 10_001, "moving"),
            &context(),
        );
        assert!((all - 0.7).abs() < 1e-9);
    }

    #[test]
    fn description_length_counts_characters() {
        let scorer = HeuristicScorer::default();
        let score = scorer.score(
            &candidate(TransactionKind::PhysicalSale, 0, "二手自行车一辆九成新"),
            &context(),
        );
        assert_eq!(score, 0.0);
    }
}
