//! Rebuilds the view an interaction happened in.

use super::home::{Home, ROTA_ELEMENT};
use super::save_rota::{
    SaveRota, SaveRotaState, ROTA_FREQUENCY, ROTA_MEMBERS, ROTA_NAME, ROTA_TYPE,
};
use super::{Metadata, View, ViewHandler, ViewType};
use crate::errors::AppError;
use crate::models::{BlockValue, InteractionPayload, RotaFrequency, RotaSchedule};

/// Resolve the view named by the payload's callback ID and hydrate its state.
///
/// Pure: no database or Slack access happens here.
pub fn resolve(payload: &InteractionPayload) -> Result<View, AppError> {
    let callback_id = payload.view.callback_id.as_str();
    match callback_id.parse::<ViewType>()? {
        ViewType::Home => resolve_home(payload).map(View::Home),
        ViewType::SaveRota => resolve_save_rota(payload).map(View::SaveRota),
    }
}

fn resolve_home(payload: &InteractionPayload) -> Result<Home, AppError> {
    let metadata = Metadata::from_json(&payload.view.private_metadata)?;

    let mut state = Home::default_state();
    state.trigger_id = payload.trigger_id.clone();
    state.team_id = payload.team.id.clone();
    state.channel_id = metadata.channel_id;

    if let Some(action) = payload.actions.first() {
        if action.action_id == ROTA_ELEMENT {
            // Overflow menus report the chosen action as the option value and
            // the rota through the block ID.
            state.action = action
                .selected_option
                .as_ref()
                .map(|o| o.value.clone())
                .unwrap_or_default();
            state.rota_id = action.block_id.clone();
        } else {
            state.action = action.action_id.clone();
        }
    }

    Ok(Home::new(state))
}

fn resolve_save_rota(payload: &InteractionPayload) -> Result<SaveRota, AppError> {
    let metadata = Metadata::from_json(&payload.view.private_metadata)?;
    let values = &payload.view.state;
    let input = |block_id: &str| values.get(block_id, block_id);

    // Fields absent from the payload stay `None` so a submit can tell them apart.
    let mut state = SaveRotaState::default();
    state.trigger_id = payload.trigger_id.clone();
    state.team_id = payload.team.id.clone();
    state.rota_id = metadata.rota_id;
    state.channel_id = metadata.channel_id;
    state.previous_view_id = payload.view.previous_view_id.clone().unwrap_or_default();
    state.external_id = payload.view.external_id.clone().unwrap_or_default();

    state.rota_name = input(ROTA_NAME).and_then(|v| v.value.clone());
    state.frequency = selected(input(ROTA_FREQUENCY)).and_then(|v| v.parse::<RotaFrequency>().ok());
    state.scheduling = selected(input(ROTA_TYPE)).and_then(|v| v.parse::<RotaSchedule>().ok());
    state.members = input(ROTA_MEMBERS).and_then(|v| v.selected_users.clone());

    Ok(SaveRota::new(state))
}

fn selected(value: Option<&BlockValue>) -> Option<&str> {
    value
        .and_then(|v| v.selected_option.as_ref())
        .map(|o| o.value.as_str())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::models::InteractionType;
    use crate::views::home::HOME_SAVE_ROTA;

    fn payload(raw: serde_json::Value) -> InteractionPayload {
        serde_json::from_value(raw).unwrap()
    }

    /// Run `f` behind the server's Sentry tracing layer and collect what Sentry received.
    fn reported_events(f: impl FnOnce()) -> Vec<sentry::protocol::Event<'static>> {
        let subscriber = tracing_subscriber::registry().with(
            sentry::integrations::tracing::layer().event_filter(crate::sentry_event_filter),
        );
        sentry::test::with_captured_events(|| tracing::subscriber::with_default(subscriber, f))
    }

    #[test]
    fn test_home_without_actions() {
        let view = resolve(&payload(serde_json::json!({
            "type": "view_closed",
            "trigger_id": "T123",
            "team": {"id": "TE123"},
            "view": {
                "callback_id": "Home",
                "private_metadata": "{\"rota_id\":\"\",\"channel_id\":\"C123\"}"
            }
        })))
        .unwrap();

        let View::Home(home) = view else {
            panic!("expected Home, got {:?}", view);
        };
        assert_eq!(home.state.trigger_id, "T123");
        assert_eq!(home.state.team_id, "TE123");
        assert_eq!(home.state.channel_id, "C123");
        assert!(home.state.action.is_empty());
        assert!(home.state.rota_id.is_empty());
    }

    #[test]
    fn test_home_button_action() {
        let view = resolve(&payload(serde_json::json!({
            "type": "block_actions",
            "view": {"callback_id": "Home", "private_metadata": "{\"channel_id\":\"C1\"}"},
            "actions": [{"action_id": "HOME_SAVE_ROTA", "block_id": "HOME_ACTIONS"}]
        })))
        .unwrap();

        let View::Home(home) = view else {
            panic!("expected Home, got {:?}", view);
        };
        assert_eq!(home.state.action, HOME_SAVE_ROTA);
        assert!(home.state.rota_id.is_empty());
    }

    #[test]
    fn test_home_overflow_action() {
        let raw = serde_json::json!({
            "type": "block_actions",
            "view": {"callback_id": "Home", "private_metadata": "{\"channel_id\":\"C1\"}"},
            "actions": [{
                "action_id": "ROTA_ELEMENT",
                "block_id": "R42",
                "selected_option": {"value": "HOME_SAVE_ROTA"}
            }]
        });
        let parsed = payload(raw);
        assert_eq!(parsed.interaction_type, InteractionType::BlockActions);

        let View::Home(home) = resolve(&parsed).unwrap() else {
            panic!("expected Home");
        };
        assert_eq!(home.state.action, HOME_SAVE_ROTA);
        assert_eq!(home.state.rota_id, "R42");
    }

    #[test]
    fn test_save_rota_from_metadata() {
        let view = resolve(&payload(serde_json::json!({
            "type": "view_submission",
            "trigger_id": "trig",
            "team": {"id": "T1"},
            "view": {
                "callback_id": "SaveRota",
                "private_metadata": "{\"rota_id\":\"R1\",\"channel_id\":\"C1\"}",
                "previous_view_id": "V0",
                "external_id": "ext"
            }
        })))
        .unwrap();

        let View::SaveRota(save) = view else {
            panic!("expected SaveRota, got {:?}", view);
        };
        assert_eq!(save.state.rota_id, "R1");
        assert_eq!(save.state.channel_id, "C1");
        assert_eq!(save.state.team_id, "T1");
        assert_eq!(save.state.trigger_id, "trig");
        assert_eq!(save.state.previous_view_id, "V0");
        assert_eq!(save.state.external_id, "ext");
        assert!(save.state.rota_name.is_none());
        assert!(save.state.members.is_none());
    }

    #[test]
    fn test_save_rota_submitted_values() {
        let view = resolve(&payload(serde_json::json!({
            "type": "view_submission",
            "team": {"id": "T1"},
            "view": {
                "callback_id": "SaveRota",
                "private_metadata": "{\"rota_id\":\"\",\"channel_id\":\"C1\"}",
                "state": {"values": {
                    "ROTA_NAME": {"ROTA_NAME": {"value": "On Call"}},
                    "ROTA_FREQUENCY": {"ROTA_FREQUENCY": {"selected_option": {"value": "Monthly"}}},
                    "ROTA_TYPE": {"ROTA_TYPE": {"selected_option": {"value": "Fortnightly-ish"}}},
                    "ROTA_MEMBERS": {"ROTA_MEMBERS": {"selected_users": ["U1", "U2"]}}
                }}
            }
        })))
        .unwrap();

        let View::SaveRota(save) = view else {
            panic!("expected SaveRota, got {:?}", view);
        };
        assert_eq!(save.state.rota_name.as_deref(), Some("On Call"));
        assert_eq!(save.state.frequency, Some(RotaFrequency::Monthly));
        assert_eq!(save.state.scheduling, None);
        assert_eq!(
            save.state.members,
            Some(vec!["U1".to_string(), "U2".to_string()])
        );
    }

    #[test]
    fn test_unknown_callback_id() {
        let err = resolve(&payload(serde_json::json!({
            "type": "block_actions",
            "view": {"callback_id": "Settings", "private_metadata": "{}"}
        })))
        .unwrap_err();
        assert!(matches!(err, AppError::UnknownView(_)));
    }

    #[test]
    fn test_invalid_metadata() {
        for callback_id in ["Home", "SaveRota"] {
            let err = resolve(&payload(serde_json::json!({
                "type": "view_submission",
                "view": {"callback_id": callback_id, "private_metadata": "C123"}
            })))
            .unwrap_err();
            assert!(matches!(err, AppError::InvalidMetadata(_)));
        }
    }

    #[test]
    fn test_unknown_callback_id_is_reported_once() {
        let events = reported_events(|| {
            let err = resolve(&payload(serde_json::json!({
                "type": "block_actions",
                "view": {"callback_id": "Settings", "private_metadata": "{}"}
            })))
            .unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        });
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_invalid_metadata_is_reported_once() {
        let events = reported_events(|| {
            let err = resolve(&payload(serde_json::json!({
                "type": "block_actions",
                "view": {"callback_id": "Home", "private_metadata": "C123"}
            })))
            .unwrap_err();
            let _ = err.into_response();
        });
        assert_eq!(events.len(), 1);
    }
}
