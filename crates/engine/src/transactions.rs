//! Transaction primitives.
//!
//! A `Transaction` is a peer-to-peer exchange between two users that carries
//! a monetary amount, an informal human value, or both. Only `status` and
//! `risk_level` change after creation, and only through a review.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, Candidate, EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    PhysicalSale,
    Barter,
    FavorGift,
    LaborService,
    Mixed,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhysicalSale => "PHYSICAL_SALE",
            Self::Barter => "BARTER",
            Self::FavorGift => "FAVOR_GIFT",
            Self::LaborService => "LABOR_SERVICE",
            Self::Mixed => "MIXED",
        }
    }

    /// Kinds that exchange goods and therefore need a monetary amount.
    pub fn requires_monetary(self) -> bool {
        matches!(self, Self::PhysicalSale | Self::Barter)
    }

    /// Kinds that are purely informal and therefore need a human value.
    pub fn is_favor(self) -> bool {
        matches!(self, Self::FavorGift | Self::LaborService)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PHYSICAL_SALE" => Ok(Self::PhysicalSale),
            "BARTER" => Ok(Self::Barter),
            "FAVOR_GIFT" => Ok(Self::FavorGift),
            "LABOR_SERVICE" => Ok(Self::LaborService),
            "MIXED" => Ok(Self::Mixed),
            other => Err(EngineError::Corrupt(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

/// Lifecycle of a transaction. `FAILED` is deliberately absent: a refused
/// candidate is never stored, so there is nothing to mark as failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Reviewing,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reviewing => "REVIEWING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "REVIEWING" => Ok(Self::Reviewing),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(EngineError::Corrupt(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Risk tier assigned by the evaluator or by a reviewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Normal,
    Review,
    Blocked,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Review => "REVIEW",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl TryFrom<&str> for RiskLevel {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "NORMAL" => Ok(Self::Normal),
            "REVIEW" => Ok(Self::Review),
            "BLOCKED" => Ok(Self::Blocked),
            other => Err(EngineError::Corrupt(format!("invalid risk level: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub from_user_id: String,
    pub to_user_id: String,
    pub kind: TransactionKind,
    pub monetary_amount: Amount,
    pub human_value_amount: Amount,
    pub description: String,
    pub status: TransactionStatus,
    pub risk_level: RiskLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds the record for an admitted candidate. New transactions always
    /// start as `PENDING`.
    pub fn admit(candidate: Candidate, risk_level: RiskLevel, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user_id: candidate.from_user_id,
            to_user_id: candidate.to_user_id,
            kind: candidate.kind,
            monetary_amount: candidate.monetary_amount,
            human_value_amount: candidate.human_value_amount,
            description: candidate.description,
            status: TransactionStatus::Pending,
            risk_level,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub kind: String,
    pub monetary_amount_minor: i64,
    pub human_value_amount_minor: i64,
    pub description: String,
    pub status: String,
    pub risk_level: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            from_user_id: ActiveValue::Set(tx.from_user_id.clone()),
            to_user_id: ActiveValue::Set(tx.to_user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            monetary_amount_minor: ActiveValue::Set(tx.monetary_amount.minor()),
            human_value_amount_minor: ActiveValue::Set(tx.human_value_amount.minor()),
            description: ActiveValue::Set(tx.description.clone()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            risk_level: ActiveValue::Set(tx.risk_level.as_str().to_string()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            from_user_id: model.from_user_id,
            to_user_id: model.to_user_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            monetary_amount: Amount::from_minor(model.monetary_amount_minor),
            human_value_amount: Amount::from_minor(model.human_value_amount_minor),
            description: model.description,
            status: TransactionStatus::try_from(model.status.as_str())?,
            risk_level: RiskLevel::try_from(model.risk_level.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
