use api_types::envelope::ApiResponse;
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::headers::{Error as AxumError, Header};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::sync::Arc;

use crate::{codes, health, reference_values, risk, transactions};
use engine::Engine;

static REVIEWER_HEADER: HeaderName = HeaderName::from_static("x-reviewer-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the reviewer identity.
///
/// Review requests may carry an "x-reviewer-id" entry; it is recorded in the
/// audit trail as-is.
#[derive(Debug)]
pub(crate) struct ReviewerHeader(pub(crate) String);

impl Header for ReviewerHeader {
    fn name() -> &'static HeaderName {
        &REVIEWER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(ReviewerHeader(value.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-reviewer-id header"),
        }
    }
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(
            codes::NOT_FOUND,
            format!("route {} not found", uri.path()),
        )),
    )
}

pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route("/transactions/{id}", get(transactions::detail))
        .route("/transactions/{id}/review", post(transactions::review))
        .route("/transactions/{id}/reviews", get(transactions::reviews))
        .route("/risk/users/{user_id}", get(risk::user_total))
        .route("/risk/pairs/{user_a}/{user_b}", get(risk::pair))
        .route("/reference-values", get(reference_values::list));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
