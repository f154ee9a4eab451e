//! Rule-based risk evaluation of candidate transactions.
//!
//! Checks run in a fixed order and the first one that fires decides the tier:
//!
//! 1. favor-for-cash guard (no storage access) → `BLOCKED`
//! 2. rolling human value of the sender → `REVIEW`
//! 3. transaction count of the pair → `REVIEW`
//! 4. rolling human value of the pair → `REVIEW`
//! 5. [`RiskScorer`] above threshold → `REVIEW`
//!
//! Everything else is `NORMAL`. Windows end at the evaluation time, so the
//! same candidate can be classified differently later on.

use std::{fmt, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{Amount, Candidate, ResultEngine, RiskLevel, TransactionLog};

pub use scoring::{HeuristicScorer, RiskScorer};

mod scoring;

/// Tunable thresholds of the rule evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskLimits {
    /// Rolling human value cap for a single user, both directions.
    pub human_monthly_limit: Amount,
    /// Rolling human value cap for a pair of users.
    pub pair_human_limit: Amount,
    /// Rolling count of transactions a pair may already have.
    pub pair_transaction_limit: u64,
    /// Human value above which a near-zero monetary amount is refused.
    pub high_value_limit: Amount,
    /// Monetary amounts below this are considered near zero.
    pub low_monetary_threshold: Amount,
    pub window: TimeDelta,
    pub score_threshold: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            human_monthly_limit: Amount::from_major(10_000),
            pair_human_limit: Amount::from_major(5_000),
            pair_transaction_limit: 20,
            high_value_limit: Amount::from_major(5_000),
            low_monetary_threshold: Amount::from_major(100),
            window: TimeDelta::days(30),
            score_threshold: 0.7,
        }
    }
}

/// The check that decided a non-normal tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskRule {
    FavorForCash,
    MonthlyHumanValue,
    PairFrequency,
    PairHumanValue,
    Score,
}

impl fmt::Display for RiskRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FavorForCash => "human value may not replace a high cash payment",
            Self::MonthlyHumanValue => "rolling human value of the sender exceeds its limit",
            Self::PairFrequency => "too many transactions between the two users",
            Self::PairHumanValue => "rolling human value between the two users exceeds its limit",
            Self::Score => "risk score above threshold",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// `None` for `NORMAL`.
    pub rule: Option<RiskRule>,
}

impl RiskAssessment {
    fn normal() -> Self {
        Self {
            level: RiskLevel::Normal,
            rule: None,
        }
    }

    fn flagged(level: RiskLevel, rule: RiskRule) -> Self {
        Self {
            level,
            rule: Some(rule),
        }
    }
}

/// Aggregates read from the log, handed to the scorer.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskContext {
    pub window_start: DateTime<Utc>,
    pub user_human_value: Amount,
    pub pair_count: u64,
    pub pair_human_value: Amount,
}

impl RiskContext {
    pub fn empty(window_start: DateTime<Utc>) -> Self {
        Self {
            window_start,
            user_human_value: Amount::ZERO,
            pair_count: 0,
            pair_human_value: Amount::ZERO,
        }
    }
}

#[derive(Clone)]
pub struct RiskEvaluator {
    limits: RiskLimits,
    scorer: Arc<dyn RiskScorer>,
}

impl fmt::Debug for RiskEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskEvaluator")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Default for RiskEvaluator {
    fn default() -> Self {
        Self::new(RiskLimits::default(), Arc::new(HeuristicScorer::default()))
    }
}

impl RiskEvaluator {
    pub fn new(limits: RiskLimits, scorer: Arc<dyn RiskScorer>) -> Self {
        Self { limits, scorer }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Start of the rolling window ending at `now` (inclusive).
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.limits.window
    }

    /// Classifies `candidate` against the history visible in `log`.
    ///
    /// Log failures are returned as-is; they never turn into a tier.
    pub async fn assess(
        &self,
        log: &dyn TransactionLog,
        candidate: &Candidate,
        now: DateTime<Utc>,
    ) -> ResultEngine<RiskAssessment> {
        let limits = &self.limits;
        let human = candidate.human_value_amount;

        if human > limits.high_value_limit
            && candidate.monetary_amount < limits.low_monetary_threshold
        {
            return Ok(RiskAssessment::flagged(
                RiskLevel::Blocked,
                RiskRule::FavorForCash,
            ));
        }

        let mut context = RiskContext::empty(self.window_start(now));
        let since = context.window_start;

        context.user_human_value = log.sum_human_value(&candidate.from_user_id, since).await?;
        if context.user_human_value + human > limits.human_monthly_limit {
            return Ok(RiskAssessment::flagged(
                RiskLevel::Review,
                RiskRule::MonthlyHumanValue,
            ));
        }

        context.pair_count = log
            .count_between_pair(&candidate.from_user_id, &candidate.to_user_id, since)
            .await?;
        if context.pair_count >= limits.pair_transaction_limit {
            return Ok(RiskAssessment::flagged(
                RiskLevel::Review,
                RiskRule::PairFrequency,
            ));
        }

        context.pair_human_value = log
            .sum_human_value_between_pair(&candidate.from_user_id, &candidate.to_user_id, since)
            .await?;
        if context.pair_human_value + human > limits.pair_human_limit {
            return Ok(RiskAssessment::flagged(
                RiskLevel::Review,
                RiskRule::PairHumanValue,
            ));
        }

        if self.scorer.score(candidate, &context) > limits.score_threshold {
            return Ok(RiskAssessment::flagged(RiskLevel::Review, RiskRule::Score));
        }

        Ok(RiskAssessment::normal())
    }
}
