//! Command structs for engine operations.
//!
//! A [`TransactionDraft`] is what a client submits: every field may be
//! missing. Validation turns it into a [`Candidate`], the only shape the risk
//! evaluator and the intake service accept.

use uuid::Uuid;

use crate::{Amount, RiskLevel, TransactionKind, TransactionStatus};

/// Unvalidated request to create a transaction.
#[derive(Clone, Debug, Default)]
pub struct TransactionDraft {
    pub from_user_id: Option<String>,
    pub to_user_id: Option<String>,
    pub kind: Option<TransactionKind>,
    pub monetary_amount: Amount,
    pub human_value_amount: Amount,
    pub description: Option<String>,
}

impl TransactionDraft {
    #[must_use]
    pub fn new(
        from_user_id: impl Into<String>,
        to_user_id: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            from_user_id: Some(from_user_id.into()),
            to_user_id: Some(to_user_id.into()),
            kind: Some(kind),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn monetary(mut self, amount: Amount) -> Self {
        self.monetary_amount = amount;
        self
    }

    #[must_use]
    pub fn human_value(mut self, amount: Amount) -> Self {
        self.human_value_amount = amount;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A transaction that passed structural validation but is not persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub from_user_id: String,
    pub to_user_id: String,
    pub kind: TransactionKind,
    pub monetary_amount: Amount,
    pub human_value_amount: Amount,
    pub description: String,
}

/// Reviewer decision on an existing transaction.
#[derive(Clone, Debug)]
pub struct ReviewCmd {
    pub transaction_id: Uuid,
    pub risk_level: RiskLevel,
    /// Left untouched when `None`.
    pub status: Option<TransactionStatus>,
    pub reason: Option<String>,
    pub reviewer_id: Option<String>,
}

impl ReviewCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid, risk_level: RiskLevel) -> Self {
        Self {
            transaction_id,
            risk_level,
            status: None,
            reason: None,
            reviewer_id: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn reviewer(mut self, reviewer_id: impl Into<String>) -> Self {
        self.reviewer_id = Some(reviewer_id.into());
        self
    }
}
