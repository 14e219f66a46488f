//! Modal views and the state machine behind them.
//!
//! A view is opened with [`ViewHandler::build_props`] followed by
//! [`ViewHandler::render`]. When Slack later reports an interaction, the
//! [`resolver`] rebuilds the view from the payload and the matching callback runs
//! inside the request's transaction.

pub mod home;
pub mod resolver;
pub mod save_rota;

pub use home::{Home, HomeState};
pub use resolver::resolve;
pub use save_rota::SaveRota;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::errors::AppError;
use crate::models::ActionResponse;
use crate::slack::{Block, ModalView, PlainText, SlackApi};

/// Callback IDs of the views we render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Home,
    SaveRota,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Home => "Home",
            ViewType::SaveRota => "SaveRota",
        }
    }

}

impl FromStr for ViewType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, AppError> {
        match s {
            "Home" => Ok(ViewType::Home),
            "SaveRota" => Ok(ViewType::SaveRota),
            other => Err(AppError::UnknownView(format!(
                "Unknown callback ID '{}'",
                other
            ))),
        }
    }
}

/// State carried across round trips in the view's `private_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Empty when creating a rota.
    #[serde(default)]
    pub rota_id: String,
    #[serde(default)]
    pub channel_id: String,
}

impl Metadata {
    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| {
            tracing::debug!(error = %e, "failed_to_marshal_metadata");
            AppError::Internal(format!("Failed to encode view metadata: {}", e))
        })
    }

    pub fn from_json(payload: &str) -> Result<Self, AppError> {
        serde_json::from_str(payload).map_err(|e| {
            tracing::debug!(error = %e, "unmarshall_metadata");
            AppError::InvalidMetadata(format!("Invalid view metadata: {}", e))
        })
    }
}

/// Collaborators available to view callbacks.
#[derive(Clone)]
pub struct ViewContext {
    pub slack: Arc<dyn SlackApi>,
}

/// Capabilities shared by every view.
#[async_trait]
pub trait ViewHandler: Send + Sync {
    type State;
    type Props: Send;

    fn callback_id(&self) -> ViewType;

    fn default_state() -> Self::State;

    /// Load whatever the view needs to render.
    async fn build_props(&self, tx: &mut SqliteConnection) -> Result<Self::Props, AppError>;

    /// The user clicked an interactive element.
    async fn on_action(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError>;

    /// The user closed the modal.
    async fn on_close(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError>;

    /// The user submitted the modal.
    async fn on_submit(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError>;

    /// Open the view as a new modal.
    async fn render(&self, ctx: &ViewContext, props: Self::Props) -> Result<(), AppError>;
}

/// A view resolved from an interaction payload, ready to act.
#[derive(Debug, Clone)]
pub enum View {
    Home(Home),
    SaveRota(SaveRota),
}

impl View {
    pub fn callback_id(&self) -> ViewType {
        match self {
            View::Home(v) => v.callback_id(),
            View::SaveRota(v) => v.callback_id(),
        }
    }

    pub async fn on_action(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        match self {
            View::Home(v) => v.on_action(ctx, tx).await,
            View::SaveRota(v) => v.on_action(ctx, tx).await,
        }
    }

    pub async fn on_close(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        match self {
            View::Home(v) => v.on_close(ctx, tx).await,
            View::SaveRota(v) => v.on_close(ctx, tx).await,
        }
    }

    pub async fn on_submit(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        match self {
            View::Home(v) => v.on_submit(ctx, tx).await,
            View::SaveRota(v) => v.on_submit(ctx, tx).await,
        }
    }
}

/// Modal request shared by all views. Slack notifies us on close and the whole
/// stack is cleared.
pub(crate) fn modal(
    callback_id: ViewType,
    title: PlainText,
    submit: Option<PlainText>,
    close: Option<PlainText>,
    blocks: Vec<Block>,
    metadata: &Metadata,
) -> Result<ModalView, AppError> {
    Ok(ModalView {
        view_type: "modal",
        title,
        submit,
        close,
        blocks,
        callback_id: callback_id.as_str().to_string(),
        notify_on_close: true,
        clear_on_close: true,
        private_metadata: metadata.to_json()?,
    })
}
