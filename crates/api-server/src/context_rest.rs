//! Attached context and click-tracking links.

use crate::rest::{AppState, ErrorResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dialog_core::DialogError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use utoipa::ToSchema;

/// POST /v1/attach — Attach properties to every outgoing message.
#[utoipa::path(
    post,
    path = "/v1/attach",
    tag = "Context",
    request_body = AttachRequest,
    responses((status = 200, description = "Context updated", body = AttachResponse))
)]
pub async fn attach(
    State(state): State<AppState>,
    Json(request): Json<AttachRequest>,
) -> Json<AttachResponse> {
    state.client.attach(request.properties);
    let context = state.client.context().snapshot();
    metrics::counter!("api.attach").increment(1);
    Json(AttachResponse { context })
}

/// DELETE /v1/attach — Stop attaching context to outgoing messages.
#[utoipa::path(
    delete,
    path = "/v1/attach",
    tag = "Context",
    responses((status = 204, description = "Context cleared"))
)]
pub async fn detach(State(state): State<AppState>) -> StatusCode {
    state.client.detach();
    StatusCode::NO_CONTENT
}

/// POST /v1/links — Build a click-tracking link.
#[utoipa::path(
    post,
    path = "/v1/links",
    tag = "Context",
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Tracking link", body = LinkResponse),
        (status = 409, description = "Credentials not configured", body = ErrorResponse),
        (status = 500, description = "Link could not be built", body = ErrorResponse),
    )
)]
pub async fn create_link(
    State(state): State<AppState>,
    Json(request): Json<LinkRequest>,
) -> Response {
    match state.client.link(&request.url, &request.distinct_id) {
        Ok(link) => Json(LinkResponse { link }).into_response(),
        Err(e @ DialogError::Credentials(_)) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "credentials_missing".to_string(),
                message: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Tracking link not built");
            ErrorResponse {
                error: "link_failed".to_string(),
                message: e.to_string(),
            }
            .into_response()
        }
    }
}

/// Properties to merge into the attached context, posted as a plain object.
#[derive(Deserialize, ToSchema)]
#[serde(transparent)]
pub struct AttachRequest {
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

#[derive(Serialize, ToSchema)]
pub struct AttachResponse {
    /// Context now attached to outgoing messages.
    #[schema(value_type = Object)]
    pub context: Map<String, Value>,
}

#[derive(Deserialize, ToSchema)]
pub struct LinkRequest {
    pub url: String,
    pub distinct_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct LinkResponse {
    pub link: String,
}
