//! Query contract between the engine and the transaction store.
//!
//! The engine never talks to the database directly: intake, review and the
//! risk evaluator only see [`TransactionLog`] and [`ReferenceCatalog`].
//! [`SqlStore`](crate::SqlStore) is the SeaORM implementation used in
//! production.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    Amount, EngineError, ReferenceValue, ResultEngine, RiskLevel, Transaction, TransactionKind,
    TransactionReview, TransactionStatus,
};

/// Filters for listing transactions. All fields are combined with AND.
///
/// `user_id` matches either side of a transaction and, when present,
/// `from_user_id`/`to_user_id` are ignored. `start`/`end` are both inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub user_id: Option<String>,
    pub from_user_id: Option<String>,
    pub to_user_id: Option<String>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub risk_level: Option<RiskLevel>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Offset pagination, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn offset(self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Reviewer changes applied atomically with their audit row.
#[derive(Clone, Debug)]
pub struct ReviewPatch {
    pub risk_level: RiskLevel,
    pub status: Option<TransactionStatus>,
    pub reason: Option<String>,
    pub reviewer_id: Option<String>,
    pub at: DateTime<Utc>,
}

#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Sum of human value over transactions where `participant` is either
    /// side, created at or after `since`.
    async fn sum_human_value(&self, participant: &str, since: DateTime<Utc>)
    -> ResultEngine<Amount>;

    /// Number of transactions between the unordered pair, created at or after
    /// `since`.
    async fn count_between_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<u64>;

    /// Sum of human value between the unordered pair, created at or after
    /// `since`.
    async fn sum_human_value_between_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<Amount>;

    async fn insert(&self, transaction: &Transaction) -> ResultEngine<Transaction>;

    async fn find_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>>;

    /// Newest first by `(created_at, id)`.
    async fn find_many(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> ResultEngine<Vec<Transaction>>;

    async fn count(&self, filter: &TransactionFilter) -> ResultEngine<u64>;

    /// Updates the transaction and appends its audit row in one unit of work.
    ///
    /// Fails with [`EngineError::NotFound`] when `id` does not exist.
    async fn apply_review(&self, id: Uuid, patch: &ReviewPatch) -> ResultEngine<Transaction>;

    /// Audit rows of a transaction, oldest first.
    async fn reviews(&self, id: Uuid) -> ResultEngine<Vec<TransactionReview>>;
}

#[async_trait]
pub trait ReferenceCatalog: Send + Sync {
    /// Inserts the entry or refreshes the one with the same label.
    async fn upsert_reference_value(
        &self,
        label: &str,
        default_value: Amount,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<ReferenceValue>;

    /// All entries ordered by label.
    async fn reference_values(&self) -> ResultEngine<Vec<ReferenceValue>>;
}

/// Bounds every call of the wrapped log by a fixed timeout.
///
/// An expired call surfaces as [`EngineError::Timeout`]; it is not retried.
pub struct TimeoutLog {
    inner: Arc<dyn TransactionLog>,
    timeout: Duration,
}

impl TimeoutLog {
    pub fn new(inner: Arc<dyn TransactionLog>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        query: &str,
        fut: impl Future<Output = ResultEngine<T>> + Send,
    ) -> ResultEngine<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(format!(
                "{query} exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl TransactionLog for TimeoutLog {
    async fn sum_human_value(
        &self,
        participant: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<Amount> {
        self.bounded(
            "sum_human_value",
            self.inner.sum_human_value(participant, since),
        )
        .await
    }

    async fn count_between_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<u64> {
        self.bounded(
            "count_between_pair",
            self.inner.count_between_pair(user_a, user_b, since),
        )
        .await
    }

    async fn sum_human_value_between_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<Amount> {
        self.bounded(
            "sum_human_value_between_pair",
            self.inner.sum_human_value_between_pair(user_a, user_b, since),
        )
        .await
    }

    async fn insert(&self, transaction: &Transaction) -> ResultEngine<Transaction> {
        self.bounded("insert", self.inner.insert(transaction)).await
    }

    async fn find_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>> {
        self.bounded("find_by_id", self.inner.find_by_id(id)).await
    }

    async fn find_many(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> ResultEngine<Vec<Transaction>> {
        self.bounded("find_many", self.inner.find_many(filter, page))
            .await
    }

    async fn count(&self, filter: &TransactionFilter) -> ResultEngine<u64> {
        self.bounded("count", self.inner.count(filter)).await
    }

    async fn apply_review(&self, id: Uuid, patch: &ReviewPatch) -> ResultEngine<Transaction> {
        self.bounded("apply_review", self.inner.apply_review(id, patch))
            .await
    }

    async fn reviews(&self, id: Uuid) -> ResultEngine<Vec<TransactionReview>> {
        self.bounded("reviews", self.inner.reviews(id)).await
    }
}
