use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON envelope shared by every `/api` endpoint.
pub mod envelope {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApiError {
        /// Stable, endpoint-specific code such as `TRANSACTION_CREATE_FAILED`.
        pub code: String,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApiResponse<T> {
        pub success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<T>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub error: Option<ApiError>,
    }

    impl<T> ApiResponse<T> {
        pub fn ok(data: T) -> Self {
            Self {
                success: true,
                message: None,
                data: Some(data),
                error: None,
            }
        }

        pub fn with_message(mut self, message: impl Into<String>) -> Self {
            self.message = Some(message.into());
            self
        }
    }

    impl ApiResponse<()> {
        pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
            Self {
                success: false,
                message: None,
                data: None,
                error: Some(ApiError {
                    code: code.into(),
                    message: message.into(),
                }),
            }
        }
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TransactionKind {
        PhysicalSale,
        Barter,
        FavorGift,
        LaborService,
        Mixed,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TransactionStatus {
        Pending,
        Reviewing,
        Completed,
        Cancelled,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RiskLevel {
        Normal,
        Review,
        Blocked,
    }

    /// Body of `POST /api/transactions`. Every field is optional on the wire
    /// so that missing ones surface as validation errors, not parse errors.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub from_user_id: Option<String>,
        pub to_user_id: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        /// Major units, at most two decimals. Missing means 0.
        pub monetary_amount: Option<f64>,
        /// Major units, at most two decimals. Missing means 0.
        pub human_value_amount: Option<f64>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub from_user_id: String,
        pub to_user_id: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub monetary_amount: f64,
        pub human_value_amount: f64,
        pub description: String,
        pub status: TransactionStatus,
        pub risk_level: RiskLevel,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string of `GET /api/transactions`.
    ///
    /// `startDate`/`endDate` accept RFC3339 or `YYYY-MM-DD`; a bare date
    /// covers the whole UTC day.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionQuery {
        pub user_id: Option<String>,
        pub from_user_id: Option<String>,
        pub to_user_id: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub status: Option<TransactionStatus>,
        pub risk_level: Option<RiskLevel>,
        pub start_date: Option<String>,
        pub end_date: Option<String>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Pagination {
        pub total: u64,
        pub page: u64,
        pub limit: u64,
        pub pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub pagination: Pagination,
    }

    /// Body of `POST /api/transactions/{id}/review`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionReviewNew {
        pub risk_level: RiskLevel,
        /// Left unchanged when missing.
        pub status: Option<TransactionStatus>,
        pub reason: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionReviewView {
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
}

pub mod risk {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserRiskView {
        pub user_id: String,
        pub human_value_total: f64,
        /// Start of the rolling window.
        pub since: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PairRiskView {
        pub user_a: String,
        pub user_b: String,
        pub transaction_count: u64,
        pub human_value_total: f64,
        pub since: DateTime<Utc>,
    }
}

pub mod reference {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReferenceValueView {
        pub id: Uuid,
        pub label: String,
        pub default_value: f64,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub message: String,
    }
}
