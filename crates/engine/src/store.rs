//! SeaORM-backed transaction log and reference catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Amount, EngineError, ReferenceCatalog, ReferenceValue, ResultEngine, Transaction,
    TransactionFilter, TransactionLog, TransactionReview,
    log::{PageRequest, ReviewPatch},
    reference_values, reviews, transactions,
};

/// Production [`TransactionLog`] over a SeaORM connection.
#[derive(Clone, Debug)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

fn participant_condition(user_id: &str) -> Condition {
    Condition::any()
        .add(transactions::Column::FromUserId.eq(user_id))
        .add(transactions::Column::ToUserId.eq(user_id))
}

fn pair_condition(user_a: &str, user_b: &str) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(transactions::Column::FromUserId.eq(user_a))
                .add(transactions::Column::ToUserId.eq(user_b)),
        )
        .add(
            Condition::all()
                .add(transactions::Column::FromUserId.eq(user_b))
                .add(transactions::Column::ToUserId.eq(user_a)),
        )
}

fn filter_condition(filter: &TransactionFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(user_id) = &filter.user_id {
        condition = condition.add(participant_condition(user_id));
    } else {
        if let Some(from) = &filter.from_user_id {
            condition = condition.add(transactions::Column::FromUserId.eq(from.as_str()));
        }
        if let Some(to) = &filter.to_user_id {
            condition = condition.add(transactions::Column::ToUserId.eq(to.as_str()));
        }
    }

    if let Some(kind) = filter.kind {
        condition = condition.add(transactions::Column::Kind.eq(kind.as_str()));
    }
    if let Some(status) = filter.status {
        condition = condition.add(transactions::Column::Status.eq(status.as_str()));
    }
    if let Some(risk_level) = filter.risk_level {
        condition = condition.add(transactions::Column::RiskLevel.eq(risk_level.as_str()));
    }
    if let Some(start) = filter.start {
        condition = condition.add(transactions::Column::CreatedAt.gte(start));
    }
    if let Some(end) = filter.end {
        condition = condition.add(transactions::Column::CreatedAt.lte(end));
    }

    condition
}

impl SqlStore {
    /// SQLite `SUM` errors on integer overflow, `TOTAL` accumulates as a
    /// float and never fails. The float is saturated back into minor units.
    async fn sum_human_value_where(&self, condition: Condition) -> ResultEngine<Amount> {
        let total: Option<f64> = transactions::Entity::find()
            .select_only()
            .column_as(Expr::cust("TOTAL(human_value_amount_minor)"), "total")
            .filter(condition)
            .into_tuple()
            .one(&self.database)
            .await?;
        Ok(Amount::from_minor(total.unwrap_or(0.0) as i64))
    }
}

#[async_trait]
impl TransactionLog for SqlStore {
    async fn sum_human_value(
        &self,
        participant: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<Amount> {
        self.sum_human_value_where(
            Condition::all()
                .add(participant_condition(participant))
                .add(transactions::Column::CreatedAt.gte(since)),
        )
        .await
    }

    async fn count_between_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<u64> {
        let count = transactions::Entity::find()
            .filter(pair_condition(user_a, user_b))
            .filter(transactions::Column::CreatedAt.gte(since))
            .count(&self.database)
            .await?;
        Ok(count)
    }

    async fn sum_human_value_between_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> ResultEngine<Amount> {
        self.sum_human_value_where(
            Condition::all()
                .add(pair_condition(user_a, user_b))
                .add(transactions::Column::CreatedAt.gte(since)),
        )
        .await
    }

    async fn insert(&self, transaction: &Transaction) -> ResultEngine<Transaction> {
        let model = transactions::ActiveModel::from(transaction)
            .insert(&self.database)
            .await?;
        Transaction::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> ResultEngine<Option<Transaction>> {
        transactions::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(Transaction::try_from)
            .transpose()
    }

    async fn find_many(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(filter_condition(filter))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn count(&self, filter: &TransactionFilter) -> ResultEngine<u64> {
        let count = transactions::Entity::find()
            .filter(filter_condition(filter))
            .count(&self.database)
            .await?;
        Ok(count)
    }

    async fn apply_review(&self, id: Uuid, patch: &ReviewPatch) -> ResultEngine<Transaction> {
        let db_tx = self.database.begin().await?;

        let model = transactions::Entity::find_by_id(id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))?;
        let before = Transaction::try_from(model.clone())?;

        let mut active: transactions::ActiveModel = model.into();
        active.risk_level = ActiveValue::Set(patch.risk_level.as_str().to_string());
        if let Some(status) = patch.status {
            active.status = ActiveValue::Set(status.as_str().to_string());
        }
        active.updated_at = ActiveValue::Set(patch.at);
        let after = Transaction::try_from(active.update(&db_tx).await?)?;

        let review = TransactionReview::between(
            &before,
            &after,
            patch.reviewer_id.clone(),
            patch.reason.clone(),
        );
        reviews::ActiveModel::from(&review).insert(&db_tx).await?;

        db_tx.commit().await?;
        Ok(after)
    }

    async fn reviews(&self, id: Uuid) -> ResultEngine<Vec<TransactionReview>> {
        reviews::Entity::find()
            .filter(reviews::Column::TransactionId.eq(id.to_string()))
            .order_by_asc(reviews::Column::CreatedAt)
            .order_by_asc(reviews::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(TransactionReview::try_from)
            .collect()
    }
}

#[async_trait]
impl ReferenceCatalog for SqlStore {
    async fn upsert_reference_value(
        &self,
        label: &str,
        default_value: Amount,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<ReferenceValue> {
        let existing = reference_values::Entity::find()
            .filter(reference_values::Column::Label.eq(label))
            .one(&self.database)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: reference_values::ActiveModel = model.into();
                active.default_value_minor = ActiveValue::Set(default_value.minor());
                active.description = ActiveValue::Set(description.map(ToString::to_string));
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.database).await?
            }
            None => {
                let value = ReferenceValue {
                    id: Uuid::new_v4(),
                    label: label.to_string(),
                    default_value,
                    description: description.map(ToString::to_string),
                    created_at: now,
                    updated_at: now,
                };
                reference_values::ActiveModel::from(&value)
                    .insert(&self.database)
                    .await?
            }
        };

        ReferenceValue::try_from(model)
    }

    async fn reference_values(&self) -> ResultEngine<Vec<ReferenceValue>> {
        reference_values::Entity::find()
            .order_by_asc(reference_values::Column::Label)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ReferenceValue::try_from)
            .collect()
    }
}
