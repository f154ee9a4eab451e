use chrono::Utc;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, RiskLevel, Transaction, TransactionDraft, TransactionFilter,
    log::PageRequest, validate,
};

use super::Engine;

/// One page of a filtered listing.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Matches across all pages.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl TransactionPage {
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.limit)
    }
}

impl Engine {
    /// Validate, classify and persist a new transaction.
    ///
    /// The aggregate reads and the insert run under the locks of both users,
    /// so concurrent intakes touching a user observe each other. Blocked
    /// candidates are never stored.
    pub async fn create_transaction(&self, draft: TransactionDraft) -> ResultEngine<Transaction> {
        let candidate = validate(draft)?;

        let _guard = self
            .locks
            .lock([
                candidate.from_user_id.as_str(),
                candidate.to_user_id.as_str(),
            ])
            .await;

        let now = Utc::now();
        let assessment = self
            .evaluator
            .assess(self.log.as_ref(), &candidate, now)
            .await?;

        if assessment.level == RiskLevel::Blocked {
            let reason = assessment
                .rule
                .map(|rule| rule.to_string())
                .unwrap_or_else(|| "blocked".to_string());
            tracing::warn!(
                from = %candidate.from_user_id,
                to = %candidate.to_user_id,
                kind = candidate.kind.as_str(),
                human_value = %candidate.human_value_amount,
                monetary = %candidate.monetary_amount,
                "transaction blocked: {reason}"
            );
            return Err(EngineError::RiskBlocked(reason));
        }

        let transaction = self
            .log
            .insert(&Transaction::admit(candidate, assessment.level, now))
            .await?;

        tracing::info!(
            id = %transaction.id,
            risk_level = transaction.risk_level.as_str(),
            rule = ?assessment.rule,
            "transaction created"
        );
        Ok(transaction)
    }

    /// Filtered, newest-first page of transactions.
    ///
    /// `page` defaults to 1 and `limit` to the configured default; both must
    /// be at least 1 and `limit` may not exceed the configured maximum. The
    /// resulting row offset must fit a signed 64-bit integer.
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> ResultEngine<TransactionPage> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(self.pagination.default_limit);

        if page == 0 {
            return Err(EngineError::Validation("page must be at least 1".to_string()));
        }
        if limit == 0 || limit > self.pagination.max_limit {
            return Err(EngineError::Validation(format!(
                "limit must be between 1 and {}",
                self.pagination.max_limit
            )));
        }
        let offset_fits = (page - 1)
            .checked_mul(limit)
            .is_some_and(|offset| i64::try_from(offset).is_ok());
        if !offset_fits {
            return Err(EngineError::Validation("page is out of range".to_string()));
        }
        if let (Some(start), Some(end)) = (filter.start, filter.end)
            && start > end
        {
            return Err(EngineError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }

        let request = PageRequest { page, limit };
        let transactions = self.log.find_many(filter, request).await?;
        let total = self.log.count(filter).await?;

        Ok(TransactionPage {
            transactions,
            total,
            page,
            limit,
        })
    }

    pub async fn transaction(&self, id: Uuid) -> ResultEngine<Transaction> {
        self.log
            .find_by_id(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))
    }
}
