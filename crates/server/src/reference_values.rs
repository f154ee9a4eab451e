//! Reference values API endpoints

use api_types::{envelope::ApiResponse, reference::ReferenceValueView};
use axum::{Json, extract::State};

use crate::{ServerError, WithCode, codes, server::ServerState};

/// Handle `GET /api/reference-values`
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<ReferenceValueView>>>, ServerError> {
    let values = state
        .engine
        .reference_values()
        .await
        .with_code(codes::REFERENCE_VALUE_QUERY_FAILED)?;

    let views = values
        .into_iter()
        .map(|value| ReferenceValueView {
            id: value.id,
            label: value.label,
            default_value: value.default_value.to_major_f64(),
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
        .collect();
    Ok(Json(ApiResponse::ok(views)))
}
