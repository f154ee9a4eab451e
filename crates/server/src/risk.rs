//! Risk statistics API endpoints

use api_types::{
    envelope::ApiResponse,
    risk::{PairRiskView, UserRiskView},
};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, WithCode, codes, server::ServerState};

/// Handle `GET /api/risk/users/{user_id}`
pub async fn user_total(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserRiskView>>, ServerError> {
    let total = state
        .engine
        .user_human_value_total(&user_id)
        .await
        .with_code(codes::RISK_QUERY_FAILED)?;

    Ok(Json(ApiResponse::ok(UserRiskView {
        user_id: total.user_id,
        human_value_total: total.human_value_total.to_major_f64(),
        since: total.since,
    })))
}

/// Handle `GET /api/risk/pairs/{user_a}/{user_b}`
pub async fn pair(
    State(state): State<ServerState>,
    Path((user_a, user_b)): Path<(String, String)>,
) -> Result<Json<ApiResponse<PairRiskView>>, ServerError> {
    let stats = state
        .engine
        .pair_stats(&user_a, &user_b)
        .await
        .with_code(codes::RISK_QUERY_FAILED)?;

    Ok(Json(ApiResponse::ok(PairRiskView {
        user_a: stats.user_a,
        user_b: stats.user_b,
        transaction_count: stats.transaction_count,
        human_value_total: stats.human_value_total.to_major_f64(),
        since: stats.since,
    })))
}
