//! Slack Block Kit types for building modal views.
//!
//! These types represent the subset of Block Kit the rota modals need.
//!
//! See: <https://api.slack.com/block-kit>

use serde::{Deserialize, Serialize};

/// Block Kit block types.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Header block with large text.
    Header { text: PlainText },
    /// Section block with text and optional accessory.
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        text: Text,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    /// Actions block with interactive elements.
    Actions {
        block_id: String,
        elements: Vec<ActionElement>,
    },
    /// Form input; its value is reported in `view.state.values`.
    Input {
        block_id: String,
        label: PlainText,
        element: InputElement,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        optional: bool,
    },
}

#[cfg(test)]
impl Block {
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Block::Header { .. } => None,
            Block::Section { block_id, .. } => block_id.as_deref(),
            Block::Actions { block_id, .. } | Block::Input { block_id, .. } => Some(block_id),
        }
    }
}

/// Text object of a section block.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a markdown text object.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Plain text object, for places where markdown is not allowed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Option of a select or overflow menu.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OptionObject {
    pub text: PlainText,
    pub value: String,
}

/// Accessory elements for section blocks.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    /// "..." menu.
    Overflow {
        action_id: String,
        options: Vec<OptionObject>,
    },
}

/// Action block elements.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    /// Interactive button.
    Button {
        text: PlainText,
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
}

/// Input block elements.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    PlainTextInput {
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<PlainText>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
    },
    StaticSelect {
        action_id: String,
        options: Vec<OptionObject>,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_option: Option<OptionObject>,
    },
    MultiUsersSelect {
        action_id: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        initial_users: Vec<String>,
    },
}

/// A modal view as sent to `views.open`, `views.push` and `views.update`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub view_type: &'static str,
    pub title: PlainText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<PlainText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<PlainText>,
    pub blocks: Vec<Block>,
    pub callback_id: String,
    pub notify_on_close: bool,
    pub clear_on_close: bool,
    pub private_metadata: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Envelope shared by every Web API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}
