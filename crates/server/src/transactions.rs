//! Transactions API endpoints

use api_types::{
    envelope::ApiResponse,
    transaction::{
        Pagination, RiskLevel as ApiRiskLevel, TransactionKind as ApiKind,
        TransactionListResponse, TransactionNew, TransactionQuery, TransactionReviewNew,
        TransactionReviewView, TransactionStatus as ApiStatus, TransactionView,
    },
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use axum_extra::{TypedHeader, typed_header::TypedHeaderRejection};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use engine::{
    Amount, EngineError, ReviewCmd, Transaction, TransactionDraft, TransactionFilter,
    TransactionReview,
};
use uuid::Uuid;

use crate::{
    ServerError, WithCode, codes,
    server::{ReviewerHeader, ServerState},
};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::PhysicalSale => ApiKind::PhysicalSale,
        engine::TransactionKind::Barter => ApiKind::Barter,
        engine::TransactionKind::FavorGift => ApiKind::FavorGift,
        engine::TransactionKind::LaborService => ApiKind::LaborService,
        engine::TransactionKind::Mixed => ApiKind::Mixed,
    }
}

fn engine_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::PhysicalSale => engine::TransactionKind::PhysicalSale,
        ApiKind::Barter => engine::TransactionKind::Barter,
        ApiKind::FavorGift => engine::TransactionKind::FavorGift,
        ApiKind::LaborService => engine::TransactionKind::LaborService,
        ApiKind::Mixed => engine::TransactionKind::Mixed,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Reviewing => ApiStatus::Reviewing,
        engine::TransactionStatus::Completed => ApiStatus::Completed,
        engine::TransactionStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn engine_status(status: ApiStatus) -> engine::TransactionStatus {
    match status {
        ApiStatus::Pending => engine::TransactionStatus::Pending,
        ApiStatus::Reviewing => engine::TransactionStatus::Reviewing,
        ApiStatus::Completed => engine::TransactionStatus::Completed,
        ApiStatus::Cancelled => engine::TransactionStatus::Cancelled,
    }
}

fn map_risk_level(level: engine::RiskLevel) -> ApiRiskLevel {
    match level {
        engine::RiskLevel::Normal => ApiRiskLevel::Normal,
        engine::RiskLevel::Review => ApiRiskLevel::Review,
        engine::RiskLevel::Blocked => ApiRiskLevel::Blocked,
    }
}

fn engine_risk_level(level: ApiRiskLevel) -> engine::RiskLevel {
    match level {
        ApiRiskLevel::Normal => engine::RiskLevel::Normal,
        ApiRiskLevel::Review => engine::RiskLevel::Review,
        ApiRiskLevel::Blocked => engine::RiskLevel::Blocked,
    }
}

fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        from_user_id: tx.from_user_id,
        to_user_id: tx.to_user_id,
        kind: map_kind(tx.kind),
        monetary_amount: tx.monetary_amount.to_major_f64(),
        human_value_amount: tx.human_value_amount.to_major_f64(),
        description: tx.description,
        status: map_status(tx.status),
        risk_level: map_risk_level(tx.risk_level),
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

fn review_view(review: TransactionReview) -> TransactionReviewView {
    TransactionReviewView {
        id: review.id,
        transaction_id: review.transaction_id,
        reviewer_id: review.reviewer_id,
        previous_risk_level: map_risk_level(review.previous_risk_level),
        risk_level: map_risk_level(review.risk_level),
        previous_status: map_status(review.previous_status),
        status: map_status(review.status),
        reason: review.reason,
        created_at: review.created_at,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn amount(value: Option<f64>) -> Result<Amount, EngineError> {
    value.map_or(Ok(Amount::ZERO), Amount::try_from)
}

/// Ids that are not UUIDs cannot exist, so they are reported as missing.
fn parse_id(id: &str, code: &'static str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(id)
        .map_err(|_| ServerError::engine(code, EngineError::NotFound(format!("transaction {id}"))))
}

/// RFC3339 timestamp or `YYYY-MM-DD`. A bare date expands to the first
/// (`end_of_day == false`) or last instant of that UTC day.
fn parse_date(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?
    } else {
        NaiveTime::MIN
    };
    Some(date.and_time(time).and_utc())
}

fn date_param(
    value: Option<&str>,
    name: &str,
    end_of_day: bool,
) -> Result<Option<DateTime<Utc>>, ServerError> {
    value
        .map(|raw| {
            parse_date(raw, end_of_day).ok_or_else(|| {
                ServerError::generic(
                    codes::TRANSACTION_QUERY_FAILED,
                    format!("{name} must be an RFC3339 timestamp or YYYY-MM-DD"),
                )
            })
        })
        .transpose()
}

/// Handle `POST /api/transactions`
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), ServerError> {
    let code = codes::TRANSACTION_CREATE_FAILED;
    let Json(payload) = payload.map_err(|err| ServerError::generic(code, err.body_text()))?;

    let draft = TransactionDraft {
        from_user_id: payload.from_user_id,
        to_user_id: payload.to_user_id,
        kind: payload.kind.map(engine_kind),
        monetary_amount: amount(payload.monetary_amount).with_code(code)?,
        human_value_amount: amount(payload.human_value_amount).with_code(code)?,
        description: payload.description,
    };

    let tx = state.engine.create_transaction(draft).await.with_code(code)?;
    let message = match tx.risk_level {
        engine::RiskLevel::Review => "transaction created, pending risk review",
        _ => "transaction created",
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(transaction_view(tx)).with_message(message)),
    ))
}

/// Handle `GET /api/transactions`
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TransactionListResponse>>, ServerError> {
    let code = codes::TRANSACTION_QUERY_FAILED;
    let Query(query) = query.map_err(|err| ServerError::generic(code, err.body_text()))?;

    let filter = TransactionFilter {
        user_id: non_empty(query.user_id),
        from_user_id: non_empty(query.from_user_id),
        to_user_id: non_empty(query.to_user_id),
        kind: query.kind.map(engine_kind),
        status: query.status.map(engine_status),
        risk_level: query.risk_level.map(engine_risk_level),
        start: date_param(query.start_date.as_deref(), "startDate", false)?,
        end: date_param(query.end_date.as_deref(), "endDate", true)?,
    };

    let page = state
        .engine
        .list_transactions(&filter, query.page, query.limit)
        .await
        .with_code(code)?;

    let pagination = Pagination {
        total: page.total,
        page: page.page,
        limit: page.limit,
        pages: page.pages(),
    };
    Ok(Json(ApiResponse::ok(TransactionListResponse {
        transactions: page.transactions.into_iter().map(transaction_view).collect(),
        pagination,
    })))
}

/// Handle `GET /api/transactions/{id}`
pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let code = codes::TRANSACTION_DETAIL_FAILED;
    let id = parse_id(&id, code)?;
    let tx = state.engine.transaction(id).await.with_code(code)?;
    Ok(Json(ApiResponse::ok(transaction_view(tx))))
}

/// Handle `POST /api/transactions/{id}/review`
pub async fn review(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    reviewer: Result<Option<TypedHeader<ReviewerHeader>>, TypedHeaderRejection>,
    payload: Result<Json<TransactionReviewNew>, JsonRejection>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let code = codes::TRANSACTION_REVIEW_FAILED;
    let id = parse_id(&id, code)?;
    let reviewer = reviewer.map_err(|err| ServerError::generic(code, err.to_string()))?;
    let Json(payload) = payload.map_err(|err| ServerError::generic(code, err.body_text()))?;

    let mut cmd = ReviewCmd::new(id, engine_risk_level(payload.risk_level));
    if let Some(status) = payload.status {
        cmd = cmd.status(engine_status(status));
    }
    if let Some(reason) = payload.reason {
        cmd = cmd.reason(reason);
    }
    if let Some(TypedHeader(ReviewerHeader(reviewer))) = reviewer {
        cmd = cmd.reviewer(reviewer);
    }

    let tx = state.engine.review_transaction(cmd).await.with_code(code)?;
    Ok(Json(
        ApiResponse::ok(transaction_view(tx)).with_message("review recorded"),
    ))
}

/// Handle `GET /api/transactions/{id}/reviews`
pub async fn reviews(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TransactionReviewView>>>, ServerError> {
    let code = codes::TRANSACTION_REVIEW_QUERY_FAILED;
    let id = parse_id(&id, code)?;
    let reviews = state.engine.transaction_reviews(id).await.with_code(code)?;
    Ok(Json(ApiResponse::ok(
        reviews.into_iter().map(review_view).collect(),
    )))
}
