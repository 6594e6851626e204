//! Event ingestion endpoints. The host framework posts each bot event here;
//! the response never reflects tracking failures.

use crate::rest::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dialog_core::{CustomEvent, Direction, Event};
use dialog_middleware::Outcome;
use serde::Serialize;
use utoipa::ToSchema;

/// POST /v1/events/incoming — Run the incoming middleware chain.
#[utoipa::path(
    post,
    path = "/v1/events/incoming",
    tag = "Events",
    request_body = Event,
    responses((status = 202, description = "Event accepted", body = EventResponse))
)]
pub async fn handle_incoming(
    State(state): State<AppState>,
    Json(mut event): Json<Event>,
) -> (StatusCode, Json<EventResponse>) {
    run_chain(&state, Direction::Incoming, &mut event)
}

/// POST /v1/events/outgoing — Run the outgoing middleware chain.
#[utoipa::path(
    post,
    path = "/v1/events/outgoing",
    tag = "Events",
    request_body = Event,
    responses((status = 202, description = "Event accepted", body = EventResponse))
)]
pub async fn handle_outgoing(
    State(state): State<AppState>,
    Json(mut event): Json<Event>,
) -> (StatusCode, Json<EventResponse>) {
    run_chain(&state, Direction::Outgoing, &mut event)
}

/// POST /v1/events/custom — Queue a named custom event.
#[utoipa::path(
    post,
    path = "/v1/events/custom",
    tag = "Events",
    request_body = CustomEvent,
    responses((status = 202, description = "Event accepted", body = CustomEventResponse))
)]
pub async fn handle_custom(
    State(state): State<AppState>,
    Json(event): Json<CustomEvent>,
) -> (StatusCode, Json<CustomEventResponse>) {
    let queued = state.tracker.event(event);
    metrics::counter!("api.custom_events").increment(1);
    (StatusCode::ACCEPTED, Json(CustomEventResponse { queued }))
}

fn run_chain(
    state: &AppState,
    direction: Direction,
    event: &mut Event,
) -> (StatusCode, Json<EventResponse>) {
    let report = state.chain.run(direction, event);
    let tracked = if report.tracked() { "true" } else { "false" };
    metrics::counter!("api.events", "direction" => direction.as_str(), "tracked" => tracked)
        .increment(1);
    (
        StatusCode::ACCEPTED,
        Json(EventResponse {
            tracked: report.tracked(),
            outcomes: report
                .outcomes
                .into_iter()
                .map(|(middleware, outcome)| MiddlewareOutcome {
                    middleware: middleware.to_string(),
                    outcome,
                })
                .collect(),
        }),
    )
}

#[derive(Serialize, ToSchema)]
pub struct EventResponse {
    pub tracked: bool,
    pub outcomes: Vec<MiddlewareOutcome>,
}

#[derive(Serialize, ToSchema)]
pub struct MiddlewareOutcome {
    pub middleware: String,
    #[schema(value_type = String, example = "tracked")]
    pub outcome: Outcome,
}

#[derive(Serialize, ToSchema)]
pub struct CustomEventResponse {
    pub queued: bool,
}
