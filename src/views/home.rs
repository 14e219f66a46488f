//! Home view: the list of rotas of a channel.

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::save_rota::SaveRota;
use super::{modal, Metadata, ViewContext, ViewHandler, ViewType};
use crate::db::rotas;
use crate::errors::AppError;
use crate::models::ActionResponse;
use crate::slack::blocks::{self, OverflowAction};
use crate::slack::{Block, ModalView, PlainText};

/// Opens the SaveRota modal, for a new rota or the one the overflow menu targets.
pub const HOME_SAVE_ROTA: &str = "HOME_SAVE_ROTA";

/// Block holding the "Add Rota" button.
pub const HOME_ACTIONS: &str = "HOME_ACTIONS";

/// Action ID of every rota's overflow menu.
pub const ROTA_ELEMENT: &str = "ROTA_ELEMENT";

#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub trigger_id: String,
    pub channel_id: String,
    pub team_id: String,
    /// Requested sub-action, empty unless resolved from a block action.
    pub action: String,
    /// Rota targeted by an overflow menu action, or the one just saved.
    pub rota_id: String,
}

#[derive(Debug, Clone)]
pub struct HomeProps {
    pub title: PlainText,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct Home {
    pub state: HomeState,
}

impl Home {
    pub fn new(state: HomeState) -> Self {
        Self { state }
    }

    pub(crate) fn modal(&self, props: HomeProps) -> Result<ModalView, AppError> {
        modal(
            self.callback_id(),
            props.title,
            None,
            None,
            props.blocks,
            &Metadata {
                rota_id: self.state.rota_id.clone(),
                channel_id: self.state.channel_id.clone(),
            },
        )
    }

    async fn open_save_rota(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        let mut state = SaveRota::default_state();
        state.trigger_id = self.state.trigger_id.clone();
        state.channel_id = self.state.channel_id.clone();
        state.team_id = self.state.team_id.clone();
        state.rota_id = self.state.rota_id.clone();
        let view = SaveRota::new(state);

        let props = view.build_props(tx).await.inspect_err(|e| {
            tracing::debug!(error = %e, "failed_to_build_save_rota_props");
        })?;
        let request = view.modal(props)?;

        ctx.slack
            .push_view(&self.state.trigger_id, &request)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "failed_to_push_view"))?;

        Ok(ActionResponse::clear())
    }
}

#[async_trait]
impl ViewHandler for Home {
    type State = HomeState;
    type Props = HomeProps;

    fn callback_id(&self) -> ViewType {
        ViewType::Home
    }

    fn default_state() -> HomeState {
        HomeState::default()
    }

    async fn build_props(&self, tx: &mut SqliteConnection) -> Result<HomeProps, AppError> {
        let rotas = rotas::list_by_channel(tx, &self.state.channel_id, &self.state.team_id)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "failed_to_list_rotas"))?;

        let mut blocks = vec![
            blocks::button_row(HOME_ACTIONS, "Add Rota :heavy_plus_sign:", HOME_SAVE_ROTA),
            blocks::header("Active Rotas:"),
        ];
        blocks.extend(rotas.iter().map(|rota| {
            blocks::overflow_section(
                &rota.id,
                &rota.name,
                ROTA_ELEMENT,
                &[OverflowAction {
                    name: ":spiral_note_pad: Edit Rota",
                    action: HOME_SAVE_ROTA,
                }],
            )
        }));

        Ok(HomeProps {
            title: PlainText::new("Rotabot Home"),
            blocks,
        })
    }

    async fn on_action(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        match self.state.action.as_str() {
            HOME_SAVE_ROTA => self.open_save_rota(ctx, tx).await,
            other => Err(AppError::UnknownAction(format!(
                "Unknown home action '{}'",
                other
            ))),
        }
    }

    async fn on_close(
        &self,
        _ctx: &ViewContext,
        _tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        tracing::debug!("closing_home_view");
        Ok(ActionResponse::ack())
    }

    async fn on_submit(
        &self,
        _ctx: &ViewContext,
        _tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        Err(AppError::Internal(
            "Home view cannot be submitted".to_string(),
        ))
    }

    async fn render(&self, ctx: &ViewContext, props: HomeProps) -> Result<(), AppError> {
        let request = self.modal(props)?;
        ctx.slack
            .open_view(&self.state.trigger_id, &request)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "failed_to_open_view"))?;
        Ok(())
    }
}
