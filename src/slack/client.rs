//! Slack Web API client.
//!
//! Only the modal endpoints are used: `views.open`, `views.push` and `views.update`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::SlackError;
use super::types::{ApiResponse, ModalView};

/// Modal operations the views depend on.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Open a new modal. Requires a fresh trigger ID.
    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError>;

    /// Push a modal on top of the current stack.
    async fn push_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError>;

    /// Replace an existing modal in place.
    async fn update_view(
        &self,
        view: &ModalView,
        view_id: &str,
        external_id: Option<&str>,
    ) -> Result<(), SlackError>;
}

/// Slack API client authenticated with the bot token.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    bot_token: String,
    api_base: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct TriggeredView<'a> {
    trigger_id: &'a str,
    view: &'a ModalView,
}

#[derive(Serialize)]
struct UpdatedView<'a> {
    view: &'a ModalView,
    view_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<&'a str>,
}

impl SlackClient {
    pub fn new(bot_token: String, api_base: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<(), SlackError> {
        let response = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .bearer_auth(&self.bot_token)
            .json(body)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: ApiResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        if !result.ok {
            debug!(method, error = ?result.error, "Slack API error");
            return Err(SlackError::Api(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        debug!(method, "Slack API call succeeded");
        Ok(())
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    #[instrument(skip(self, view), fields(callback_id = %view.callback_id))]
    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError> {
        self.call("views.open", &TriggeredView { trigger_id, view })
            .await
    }

    #[instrument(skip(self, view), fields(callback_id = %view.callback_id))]
    async fn push_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError> {
        self.call("views.push", &TriggeredView { trigger_id, view })
            .await
    }

    #[instrument(skip(self, view), fields(callback_id = %view.callback_id))]
    async fn update_view(
        &self,
        view: &ModalView,
        view_id: &str,
        external_id: Option<&str>,
    ) -> Result<(), SlackError> {
        self.call(
            "views.update",
            &UpdatedView {
                view,
                view_id,
                external_id,
            },
        )
        .await
    }
}
