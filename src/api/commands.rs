//! Slash command endpoint.

use axum::{extract::State, http::StatusCode, Form};

use crate::errors::AppError;
use crate::models::CommandPayload;
use crate::views::{Home, HomeState, ViewHandler};
use crate::AppState;

/// POST /slack/commands - Open the Home view of the channel.
pub async fn handle_command(
    State(state): State<AppState>,
    Form(payload): Form<CommandPayload>,
) -> Result<StatusCode, AppError> {
    tracing::debug!(
        command = %payload.command,
        text = %payload.text,
        team_id = %payload.team_id,
        channel_id = %payload.channel_id,
        user_id = %payload.user_id,
        "received_command"
    );

    let view = Home::new(HomeState {
        trigger_id: payload.trigger_id,
        channel_id: payload.channel_id,
        team_id: payload.team_id,
        ..Home::default_state()
    });

    let mut tx = state.repo.begin().await?;
    let props = view.build_props(&mut tx).await?;
    tx.commit().await?;

    view.render(&state.view_context(), props).await?;

    Ok(StatusCode::OK)
}
