use api_types::envelope::ApiResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener};

mod health;
mod reference_values;
mod risk;
mod server;
mod transactions;

pub mod types {
    pub mod envelope {
        pub use api_types::envelope::{ApiError, ApiResponse};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Pagination, TransactionListResponse, TransactionNew, TransactionQuery,
            TransactionReviewNew, TransactionReviewView, TransactionView,
        };
    }

    pub mod risk {
        pub use api_types::risk::{PairRiskView, UserRiskView};
    }

    pub mod reference {
        pub use api_types::reference::ReferenceValueView;
    }
}

/// Error codes carried in the `error.code` field of failed responses.
pub mod codes {
    pub const TRANSACTION_CREATE_FAILED: &str = "TRANSACTION_CREATE_FAILED";
    pub const TRANSACTION_QUERY_FAILED: &str = "TRANSACTION_QUERY_FAILED";
    pub const TRANSACTION_NOT_FOUND: &str = "TRANSACTION_NOT_FOUND";
    pub const TRANSACTION_DETAIL_FAILED: &str = "TRANSACTION_DETAIL_FAILED";
    pub const TRANSACTION_REVIEW_FAILED: &str = "TRANSACTION_REVIEW_FAILED";
    pub const TRANSACTION_REVIEW_QUERY_FAILED: &str = "TRANSACTION_REVIEW_QUERY_FAILED";
    pub const RISK_QUERY_FAILED: &str = "RISK_QUERY_FAILED";
    pub const REFERENCE_VALUE_QUERY_FAILED: &str = "REFERENCE_VALUE_QUERY_FAILED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

pub enum ServerErrorKind {
    Engine(EngineError),
    /// Request that could not be parsed into an engine call.
    Generic(String),
}

/// Failure of an endpoint, tagged with the endpoint's error code.
pub struct ServerError {
    code: &'static str,
    kind: ServerErrorKind,
}

impl ServerError {
    pub fn engine(code: &'static str, err: EngineError) -> Self {
        Self {
            code,
            kind: ServerErrorKind::Engine(err),
        }
    }

    pub fn generic(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: ServerErrorKind::Generic(message.into()),
        }
    }
}

/// Attaches an endpoint error code to engine results.
pub(crate) trait WithCode<T> {
    fn with_code(self, code: &'static str) -> Result<T, ServerError>;
}

impl<T> WithCode<T> for Result<T, EngineError> {
    fn with_code(self, code: &'static str) -> Result<T, ServerError> {
        self.map_err(|err| ServerError::engine(code, err))
    }
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::RiskBlocked(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Timeout(_)
        | EngineError::Corrupt(_)
        | EngineError::Config(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(code: &str, err: EngineError) -> String {
    if err.is_infrastructure() {
        tracing::error!(code, "engine failure: {err}");
        return "internal server error".to_string();
    }
    err.to_string()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self.kind {
            ServerErrorKind::Engine(err) => {
                let status = status_for_engine_error(&err);
                // Missing records share one code whatever the endpoint.
                let code = if status == StatusCode::NOT_FOUND {
                    codes::TRANSACTION_NOT_FOUND
                } else {
                    self.code
                };
                (status, code, message_for_engine_error(code, err))
            }
            ServerErrorKind::Generic(message) => (StatusCode::BAD_REQUEST, self.code, message),
        };

        (status, Json(ApiResponse::failure(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    fn engine_error(err: EngineError) -> axum::response::Response {
        ServerError::engine(codes::TRANSACTION_CREATE_FAILED, err).into_response()
    }

    #[test]
    fn validation_maps_to_400() {
        let res = engine_error(EngineError::Validation("x".to_string()));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blocked_maps_to_400() {
        let res = engine_error(EngineError::RiskBlocked("x".to_string()));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = ServerError::engine(
            codes::TRANSACTION_REVIEW_FAILED,
            EngineError::NotFound("x".to_string()),
        )
        .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let res = engine_error(EngineError::Database(DbErr::Custom("boom".to_string())));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = engine_error(EngineError::Timeout("sum_human_value".to_string()));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::generic(codes::TRANSACTION_QUERY_FAILED, "bad").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_message_is_hidden() {
        let message = message_for_engine_error(
            codes::RISK_QUERY_FAILED,
            EngineError::Database(DbErr::Custom("disk I/O error at page 7".to_string())),
        );
        assert_eq!(message, "internal server error");
    }
}
