//! Events API endpoint.

use axum::Json;

use crate::models::{EventPayload, EventResponse};

/// POST /slack/events - Answer the URL verification handshake.
///
/// No event subscriptions are handled yet; anything else is acknowledged.
pub async fn handle_event(Json(event): Json<EventPayload>) -> Json<EventResponse> {
    match event.event_type.as_str() {
        "url_verification" => Json(EventResponse {
            challenge: event.challenge,
        }),
        other => {
            tracing::debug!(event_type = %other, team_id = ?event.team_id, "ignored_event");
            Json(EventResponse::default())
        }
    }
}
