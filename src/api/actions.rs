//! Interactivity endpoint: block actions, view submissions and closed views.

use axum::{extract::State, Form, Json};

use crate::errors::AppError;
use crate::models::{ActionForm, ActionResponse, InteractionPayload, InteractionType};
use crate::views::resolve;
use crate::AppState;

/// POST /slack/message_actions - Run the callback of the view acted upon.
///
/// The callback runs in a single transaction, committed only when it succeeds
/// without asking Slack to show validation errors.
pub async fn handle_action(
    State(state): State<AppState>,
    Form(form): Form<ActionForm>,
) -> Result<Json<ActionResponse>, AppError> {
    let payload: InteractionPayload = serde_json::from_str(&form.payload).map_err(|e| {
        tracing::warn!(error = %e, "invalid_interaction_payload");
        AppError::BadRequest(format!("Invalid interaction payload: {}", e))
    })?;

    let view = resolve(&payload)?;
    let ctx = state.view_context();

    tracing::debug!(
        interaction_type = ?payload.interaction_type,
        callback_id = view.callback_id().as_str(),
        team_id = %payload.team.id,
        user_id = %payload.user.id,
        "received_interaction"
    );

    let mut tx = state.repo.begin().await?;
    let result = match payload.interaction_type {
        InteractionType::BlockActions => view.on_action(&ctx, &mut tx).await,
        InteractionType::ViewSubmission => view.on_submit(&ctx, &mut tx).await,
        InteractionType::ViewClosed => view.on_close(&ctx, &mut tx).await,
        InteractionType::Other => {
            tracing::warn!("unknown_interaction_type");
            return Ok(Json(ActionResponse::clear()));
        }
    };

    match result {
        Ok(response) if response.is_validation_error() => {
            tx.rollback().await?;
            Ok(Json(response))
        }
        Ok(response) => {
            tx.commit().await?;
            Ok(Json(response))
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "failed_to_rollback");
            }
            Err(e)
        }
    }
}
