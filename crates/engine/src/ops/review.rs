use chrono::Utc;
use uuid::Uuid;

use crate::{
    ResultEngine, ReviewCmd, Transaction, TransactionReview, log::ReviewPatch,
    util::normalize_optional_text,
};

use super::Engine;

impl Engine {
    /// Apply a reviewer decision. Any tier may be reviewed, including
    /// `NORMAL`; the status only changes when the command carries one.
    pub async fn review_transaction(&self, cmd: ReviewCmd) -> ResultEngine<Transaction> {
        let patch = ReviewPatch {
            risk_level: cmd.risk_level,
            status: cmd.status,
            reason: normalize_optional_text(cmd.reason.as_deref()),
            reviewer_id: normalize_optional_text(cmd.reviewer_id.as_deref()),
            at: Utc::now(),
        };

        let transaction = self.log.apply_review(cmd.transaction_id, &patch).await?;

        tracing::info!(
            id = %transaction.id,
            risk_level = transaction.risk_level.as_str(),
            status = transaction.status.as_str(),
            reviewer = patch.reviewer_id.as_deref().unwrap_or("-"),
            "transaction reviewed"
        );
        Ok(transaction)
    }

    /// Audit trail of a transaction, oldest first.
    pub async fn transaction_reviews(&self, id: Uuid) -> ResultEngine<Vec<TransactionReview>> {
        self.transaction(id).await?;
        self.log.reviews(id).await
    }
}
