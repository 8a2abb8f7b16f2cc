use crate::api::truncate;
use crate::models::{ErrorResponse, ProjectRequest, StatusResponse};
use crate::server::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, instrument, warn};

/// Errors returned to webhook callers as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidSecret,
    BadRequest(StatusCode, String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidSecret => (StatusCode::FORBIDDEN, "Invalid secret provided.".to_string()),
            ApiError::BadRequest(status, detail) => (status, detail),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            },
            other => other.status(),
        };
        ApiError::BadRequest(status, rejection.body_text())
    }
}

/// Equality check whose running time does not depend on where the inputs differ.
fn secrets_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= (x ^ y) as usize;
    }
    diff == 0
}

pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse::new(
        "ok",
        "LLM Code Deployment Agent is running!",
    ))
}

/// Verifies the secret, then hands the request to a detached deployment task.
#[instrument(skip_all)]
pub async fn build_my_app(
    State(state): State<AppState>,
    payload: Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected malformed build request: {}", e.body_text());
        ApiError::from(e)
    })?;
    info!(
        "Received request for task: {}, round: {}",
        request.task, request.round
    );

    if !secrets_match(&request.secret, &state.secret) {
        error!(
            "Secret Mismatch! Request secret: {}...",
            truncate(&request.secret, 8)
        );
        return Err(ApiError::InvalidSecret);
    }

    let deployer = state.deployer.clone();
    state.jobs.spawn(async move {
        let outcome = deployer.process(request).await;
        info!("Background job finished: {:?}", outcome);
    });

    Ok(Json(StatusResponse::new(
        "success",
        "Request received and processing started in the background.",
    )))
}
