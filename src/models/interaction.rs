//! Slack callback payloads and the responses we send back.
//!
//! Only the fields the backend reads are modelled; everything else Slack sends is ignored.
//!
//! See: <https://api.slack.com/reference/interaction-payloads>

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Slash command, sent form-encoded.
///
/// See: <https://api.slack.com/interactivity/slash-commands>
#[derive(Debug, Clone, Deserialize)]
pub struct CommandPayload {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub trigger_id: String,
    pub user_id: String,
    pub team_id: String,
    pub channel_id: String,
}

/// Events API callback.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Answer to an Events API callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
}

/// Form body of an interactive callback; `payload` holds the JSON interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionForm {
    pub payload: String,
}

/// Kind of interaction reported by Slack.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    BlockActions,
    ViewSubmission,
    ViewClosed,
    #[default]
    #[serde(other)]
    Other,
}

/// Decoded interactive callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionPayload {
    #[serde(rename = "type", default)]
    pub interaction_type: InteractionType,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub team: InteractionTeam,
    #[serde(default)]
    pub user: InteractionUser,
    #[serde(default)]
    pub view: InteractionView,
    /// Present for `block_actions` only.
    #[serde(default)]
    pub actions: Vec<BlockAction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionTeam {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionUser {
    #[serde(default)]
    pub id: String,
}

/// The modal the interaction happened in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionView {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub private_metadata: String,
    #[serde(default)]
    pub previous_view_id: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub state: ViewStateValues,
}

/// Current input values, keyed by block ID then action ID.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewStateValues {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, BlockValue>>,
}

impl ViewStateValues {
    /// Value of the element `action_id` inside block `block_id`.
    pub fn get(&self, block_id: &str, action_id: &str) -> Option<&BlockValue> {
        self.values.get(block_id)?.get(action_id)
    }
}

/// Value of a single input element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    #[serde(default)]
    pub selected_users: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

/// An interactive element the user clicked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
}

/// `response_action` understood by Slack for view submissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseAction {
    Clear,
    Errors,
}

/// Body returned for an interactive callback.
///
/// See: <https://api.slack.com/surfaces/modals#displaying_errors>
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResponse {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response_action: Option<ResponseAction>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub errors: BTreeMap<String, String>,
}

impl ActionResponse {
    /// Plain acknowledgement.
    pub fn ack() -> Self {
        Self::default()
    }

    /// Close every modal in the stack.
    pub fn clear() -> Self {
        Self {
            response_action: Some(ResponseAction::Clear),
            errors: BTreeMap::new(),
        }
    }

    /// Keep the modal open and show `message` under the input in `block_id`.
    pub fn field_error(block_id: &str, message: &str) -> Self {
        Self {
            response_action: Some(ResponseAction::Errors),
            errors: BTreeMap::from([(block_id.to_string(), message.to_string())]),
        }
    }

    pub fn is_validation_error(&self) -> bool {
        self.response_action == Some(ResponseAction::Errors)
    }
}
