//! Review audit trail.
//!
//! Every reviewer decision is stored as an append-only row next to the
//! transaction it changed, together with the values it replaced.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, RiskLevel, Transaction, TransactionStatus, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReview {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub reviewer_id: Option<String>,
    pub previous_risk_level: RiskLevel,
    pub risk_level: RiskLevel,
    pub previous_status: TransactionStatus,
    pub status: TransactionStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionReview {
    /// Records the transition from `before` to `after`.
    pub fn between(
        before: &Transaction,
        after: &Transaction,
        reviewer_id: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id: before.id,
            reviewer_id,
            previous_risk_level: before.risk_level,
            risk_level: after.risk_level,
            previous_status: before.status,
            status: after.status,
            reason,
            created_at: after.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub reviewer_id: Option<String>,
    pub previous_risk_level: String,
    pub risk_level: String,
    pub previous_status: String,
    pub status: String,
    pub reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id"
    )]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransactionReview> for ActiveModel {
    fn from(review: &TransactionReview) -> Self {
        Self {
            id: ActiveValue::Set(review.id.to_string()),
            transaction_id: ActiveValue::Set(review.transaction_id.to_string()),
            reviewer_id: ActiveValue::Set(review.reviewer_id.clone()),
            previous_risk_level: ActiveValue::Set(review.previous_risk_level.as_str().to_string()),
            risk_level: ActiveValue::Set(review.risk_level.as_str().to_string()),
            previous_status: ActiveValue::Set(review.previous_status.as_str().to_string()),
            status: ActiveValue::Set(review.status.as_str().to_string()),
            reason: ActiveValue::Set(review.reason.clone()),
            created_at: ActiveValue::Set(review.created_at),
        }
    }
}

impl TryFrom<Model> for TransactionReview {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "review")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            reviewer_id: model.reviewer_id,
            previous_risk_level: RiskLevel::try_from(model.previous_risk_level.as_str())?,
            risk_level: RiskLevel::try_from(model.risk_level.as_str())?,
            previous_status: TransactionStatus::try_from(model.previous_status.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            reason: model.reason,
            created_at: model.created_at,
        })
    }
}
