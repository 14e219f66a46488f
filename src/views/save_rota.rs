//! SaveRota view: the form creating a rota or editing an existing one.

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::home::{Home, HomeState};
use super::{modal, Metadata, ViewContext, ViewHandler, ViewType};
use crate::db::{members, rotas};
use crate::errors::AppError;
use crate::models::{
    ActionResponse, Rota, RotaFrequency, RotaMetadata, RotaSchedule, SaveRotaParams,
};
use crate::slack::blocks;
use crate::slack::{Block, ModalView, PlainText};

pub const ROTA_NAME: &str = "ROTA_NAME";
pub const ROTA_FREQUENCY: &str = "ROTA_FREQUENCY";
pub const ROTA_TYPE: &str = "ROTA_TYPE";
pub const ROTA_MEMBERS: &str = "ROTA_MEMBERS";

pub const NAME_TAKEN: &str = "A rota with this name already exists in this channel.";
pub const NAME_REQUIRED: &str = "A rota name is required.";

/// Form state. `None` means the value was not part of the payload.
#[derive(Debug, Clone, Default)]
pub struct SaveRotaState {
    pub trigger_id: String,
    pub channel_id: String,
    pub team_id: String,
    /// Empty when creating.
    pub rota_id: String,
    pub previous_view_id: String,
    pub external_id: String,
    pub rota_name: Option<String>,
    pub frequency: Option<RotaFrequency>,
    pub scheduling: Option<RotaSchedule>,
    pub members: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SaveRotaProps {
    pub title: PlainText,
    pub submit: PlainText,
    pub close: PlainText,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct SaveRota {
    pub state: SaveRotaState,
}

impl SaveRota {
    pub fn new(state: SaveRotaState) -> Self {
        Self { state }
    }

    fn is_update(&self) -> bool {
        !self.state.rota_id.is_empty()
    }

    pub(crate) fn modal(&self, props: SaveRotaProps) -> Result<ModalView, AppError> {
        modal(
            self.callback_id(),
            props.title,
            Some(props.submit),
            Some(props.close),
            props.blocks,
            &Metadata {
                rota_id: self.state.rota_id.clone(),
                channel_id: self.state.channel_id.clone(),
            },
        )
    }

    /// Submitted values, completed from the stored rota when editing and from
    /// the defaults when creating.
    async fn params(&self, tx: &mut SqliteConnection) -> Result<SaveRotaParams, AppError> {
        let state = &self.state;
        let complete =
            state.rota_name.is_some() && state.frequency.is_some() && state.scheduling.is_some();

        let stored = if self.is_update() && !complete {
            Some(rotas::find_by_id(tx, &state.rota_id).await?)
        } else {
            None
        };
        let fallback = stored.as_ref().map(|r| r.metadata).unwrap_or_default();

        Ok(SaveRotaParams {
            rota_id: state.rota_id.clone(),
            team_id: state.team_id.clone(),
            channel_id: state.channel_id.clone(),
            name: state
                .rota_name
                .as_deref()
                .or(stored.as_ref().map(|r| r.name.as_str()))
                .unwrap_or_default()
                .trim()
                .to_string(),
            metadata: RotaMetadata {
                frequency: state.frequency.unwrap_or(fallback.frequency),
                scheduling: state.scheduling.unwrap_or(fallback.scheduling),
            },
        })
    }

    async fn back_to_home(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
        saved_id: &str,
    ) -> Result<(), AppError> {
        if self.state.previous_view_id.is_empty() {
            tracing::debug!("no_previous_view");
            return Ok(());
        }

        let home = Home::new(HomeState {
            trigger_id: self.state.trigger_id.clone(),
            channel_id: self.state.channel_id.clone(),
            team_id: self.state.team_id.clone(),
            rota_id: saved_id.to_string(),
            ..HomeState::default()
        });
        let props = home.build_props(tx).await.inspect_err(|e| {
            tracing::debug!(error = %e, "failed_to_build_home_props");
        })?;
        let request = home.modal(props)?;

        // Updating the parent is the only way back to Home after a submission.
        // Sent without a hash so Slack never answers hash_conflict.
        let external_id = Some(self.state.external_id.as_str()).filter(|id| !id.is_empty());
        ctx.slack
            .update_view(&request, &self.state.previous_view_id, external_id)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "failed_to_update_home_view"))?;

        Ok(())
    }
}

#[async_trait]
impl ViewHandler for SaveRota {
    type State = SaveRotaState;
    type Props = SaveRotaProps;

    fn callback_id(&self) -> ViewType {
        ViewType::SaveRota
    }

    fn default_state() -> SaveRotaState {
        SaveRotaState {
            frequency: Some(RotaFrequency::Weekly),
            scheduling: Some(RotaSchedule::CreatedOrder),
            ..SaveRotaState::default()
        }
    }

    async fn build_props(&self, tx: &mut SqliteConnection) -> Result<SaveRotaProps, AppError> {
        let (title, submit, name, metadata, members) = if self.is_update() {
            let Rota { name, metadata, .. } = rotas::find_by_id(tx, &self.state.rota_id)
                .await
                .inspect_err(|e| tracing::debug!(error = %e, "failed_to_find"))?;
            let members = rotas::list_member_user_ids(tx, &self.state.rota_id)
                .await
                .inspect_err(|e| tracing::debug!(error = %e, "failed_to_list_members"))?;
            ("Update Rota", "Update", name, metadata, members)
        } else {
            let metadata = RotaMetadata {
                frequency: self.state.frequency.unwrap_or_default(),
                scheduling: self.state.scheduling.unwrap_or_default(),
            };
            (
                "Create Rota",
                "Create",
                self.state.rota_name.clone().unwrap_or_default(),
                metadata,
                self.state.members.clone().unwrap_or_default(),
            )
        };

        let frequencies = RotaFrequency::ALL.map(|f| f.as_str());
        let schedules = RotaSchedule::ALL.map(|s| s.as_str());

        Ok(SaveRotaProps {
            title: PlainText::new(title),
            submit: PlainText::new(submit),
            close: PlainText::new("Cancel"),
            blocks: vec![
                blocks::text_input(ROTA_NAME, "Name:", "e.g. 'On Call'", &name),
                blocks::static_select(
                    ROTA_FREQUENCY,
                    "Frequency:",
                    metadata.frequency.as_str(),
                    &frequencies,
                ),
                blocks::static_select(
                    ROTA_TYPE,
                    "Scheduling Type:",
                    metadata.scheduling.as_str(),
                    &schedules,
                ),
                blocks::users_select(ROTA_MEMBERS, "Members:", &members),
            ],
        })
    }

    async fn on_action(
        &self,
        _ctx: &ViewContext,
        _tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        tracing::debug!("action_view");
        Ok(ActionResponse::ack())
    }

    async fn on_close(
        &self,
        _ctx: &ViewContext,
        _tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        tracing::debug!("closing_view");
        Ok(ActionResponse::ack())
    }

    async fn on_submit(
        &self,
        ctx: &ViewContext,
        tx: &mut SqliteConnection,
    ) -> Result<ActionResponse, AppError> {
        let params = self.params(tx).await?;
        if params.name.is_empty() {
            return Ok(ActionResponse::field_error(ROTA_NAME, NAME_REQUIRED));
        }

        let id = match rotas::create_or_update(tx, &params).await {
            Ok(id) => id,
            Err(AppError::AlreadyExists(_)) => {
                return Ok(ActionResponse::field_error(ROTA_NAME, NAME_TAKEN));
            }
            Err(e) => return Err(e),
        };

        if let Some(desired) = &self.state.members {
            members::reconcile(tx, &id, desired).await?;
        }
        tracing::info!(id = %id, "saved_rota");

        self.back_to_home(ctx, tx, &id).await?;
        Ok(ActionResponse::ack())
    }

    async fn render(&self, ctx: &ViewContext, props: SaveRotaProps) -> Result<(), AppError> {
        let request = self.modal(props)?;
        ctx.slack
            .open_view(&self.state.trigger_id, &request)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "failed_to_open_view"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::test_support::{new_rota, repository};
    use crate::models::ResponseAction;
    use crate::slack::testing::{RecordingSlack, SlackCall};

    fn context() -> (ViewContext, Arc<RecordingSlack>) {
        let slack = Arc::new(RecordingSlack::default());
        (
            ViewContext {
                slack: slack.clone(),
            },
            slack,
        )
    }

    fn submitted(name: &str, members: &[&str]) -> SaveRotaState {
        SaveRotaState {
            trigger_id: "trigger".to_string(),
            channel_id: "C1".to_string(),
            team_id: "T1".to_string(),
            previous_view_id: "V1".to_string(),
            rota_name: Some(name.to_string()),
            frequency: Some(RotaFrequency::Daily),
            scheduling: Some(RotaSchedule::Random),
            members: Some(members.iter().map(|m| m.to_string()).collect()),
            ..SaveRotaState::default()
        }
    }

    fn users(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_default_state() {
        let state = SaveRota::default_state();
        assert_eq!(state.frequency, Some(RotaFrequency::Weekly));
        assert_eq!(state.scheduling, Some(RotaSchedule::CreatedOrder));
        assert!(state.rota_id.is_empty());
    }

    #[tokio::test]
    async fn test_build_props_for_new_rota() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();

        let view = SaveRota::new(SaveRota::default_state());
        let props = view.build_props(&mut tx).await.unwrap();
        assert_eq!(props.title.text, "Create Rota");
        assert_eq!(props.submit.text, "Create");
        assert_eq!(props.close.text, "Cancel");

        let ids: Vec<_> = props.blocks.iter().filter_map(|b| b.block_id()).collect();
        assert_eq!(ids, vec![ROTA_NAME, ROTA_FREQUENCY, ROTA_TYPE, ROTA_MEMBERS]);

        let frequency = serde_json::to_value(&props.blocks[1]).unwrap();
        assert_eq!(frequency["element"]["initial_option"]["value"], "Weekly");
        let schedule = serde_json::to_value(&props.blocks[2]).unwrap();
        assert_eq!(schedule["element"]["initial_option"]["value"], "Created At");
    }

    #[tokio::test]
    async fn test_build_props_for_existing_rota() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let mut params = new_rota("T1", "C1", "On Call");
        params.metadata.frequency = RotaFrequency::Monthly;
        let id = rotas::create_or_update(&mut tx, &params).await.unwrap();
        members::reconcile(&mut tx, &id, &users(&["U1", "U2"]))
            .await
            .unwrap();

        let view = SaveRota::new(SaveRotaState {
            rota_id: id,
            channel_id: "C1".to_string(),
            ..SaveRota::default_state()
        });
        let props = view.build_props(&mut tx).await.unwrap();
        assert_eq!(props.title.text, "Update Rota");
        assert_eq!(props.submit.text, "Update");

        let name = serde_json::to_value(&props.blocks[0]).unwrap();
        assert_eq!(name["element"]["initial_value"], "On Call");
        let frequency = serde_json::to_value(&props.blocks[1]).unwrap();
        assert_eq!(frequency["element"]["initial_option"]["value"], "Monthly");
        let members = serde_json::to_value(&props.blocks[3]).unwrap();
        assert_eq!(members["element"]["initial_users"], serde_json::json!(["U1", "U2"]));
    }

    #[tokio::test]
    async fn test_submit_creates_rota_and_returns_home() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let (ctx, slack) = context();

        let mut state = submitted("On Call", &["U1", "U2"]);
        state.external_id = "ext-1".to_string();
        let response = SaveRota::new(state)
            .on_submit(&ctx, &mut tx)
            .await
            .unwrap();
        assert_eq!(response, ActionResponse::ack());

        let saved = rotas::list_by_channel(&mut tx, "C1", "T1").await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "On Call");
        assert_eq!(saved[0].metadata.frequency, RotaFrequency::Daily);
        assert_eq!(saved[0].metadata.scheduling, RotaSchedule::Random);
        assert_eq!(
            rotas::list_member_user_ids(&mut tx, &saved[0].id).await.unwrap(),
            users(&["U1", "U2"])
        );

        let calls = slack.calls();
        assert_eq!(calls.len(), 1);
        let SlackCall::Update {
            view_id,
            external_id,
            view,
        } = &calls[0]
        else {
            panic!("expected views.update, got {:?}", calls[0]);
        };
        assert_eq!(view_id, "V1");
        assert_eq!(external_id.as_deref(), Some("ext-1"));
        assert_eq!(view.callback_id, "Home");
        assert_eq!(view.blocks[2].block_id(), Some(saved[0].id.as_str()));
        assert_eq!(
            view.private_metadata,
            format!(r#"{{"rota_id":"{}","channel_id":"C1"}}"#, saved[0].id)
        );
    }

    #[tokio::test]
    async fn test_submit_updates_rota_and_members() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let id = rotas::create_or_update(&mut tx, &new_rota("T1", "C1", "On Call"))
            .await
            .unwrap();
        members::reconcile(&mut tx, &id, &users(&["U1", "U2"]))
            .await
            .unwrap();
        let (ctx, slack) = context();

        let mut state = submitted("Support", &["U2", "U3"]);
        state.rota_id = id.clone();
        SaveRota::new(state).on_submit(&ctx, &mut tx).await.unwrap();

        let rota = rotas::find_by_id(&mut tx, &id).await.unwrap();
        assert_eq!(rota.name, "Support");
        assert_eq!(
            rotas::list_member_user_ids(&mut tx, &id).await.unwrap(),
            users(&["U2", "U3"])
        );
        assert!(slack.calls()[0].view().private_metadata.contains("\"C1\""));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_a_field_error() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let existing = rotas::create_or_update(&mut tx, &new_rota("T1", "C1", "On Call"))
            .await
            .unwrap();
        members::reconcile(&mut tx, &existing, &users(&["U1"]))
            .await
            .unwrap();
        let (ctx, slack) = context();

        let response = SaveRota::new(submitted("On Call", &["U9"]))
            .on_submit(&ctx, &mut tx)
            .await
            .unwrap();

        assert_eq!(response.response_action, Some(ResponseAction::Errors));
        assert_eq!(response.errors.get(ROTA_NAME).map(String::as_str), Some(NAME_TAKEN));
        assert_eq!(
            rotas::list_member_user_ids(&mut tx, &existing).await.unwrap(),
            users(&["U1"])
        );
        assert!(slack.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_is_a_field_error() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let (ctx, _slack) = context();

        let response = SaveRota::new(submitted("   ", &[]))
            .on_submit(&ctx, &mut tx)
            .await
            .unwrap();
        assert_eq!(response.errors.get(ROTA_NAME).map(String::as_str), Some(NAME_REQUIRED));
        assert!(rotas::list_by_channel(&mut tx, "C1", "T1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_edit_keeps_stored_values() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let mut params = new_rota("T1", "C1", "On Call");
        params.metadata.frequency = RotaFrequency::Monthly;
        let id = rotas::create_or_update(&mut tx, &params).await.unwrap();
        members::reconcile(&mut tx, &id, &users(&["U1"])).await.unwrap();
        let (ctx, _slack) = context();

        let view = SaveRota::new(SaveRotaState {
            rota_id: id.clone(),
            channel_id: "C1".to_string(),
            team_id: "T1".to_string(),
            scheduling: Some(RotaSchedule::Random),
            ..SaveRotaState::default()
        });
        view.on_submit(&ctx, &mut tx).await.unwrap();

        let rota = rotas::find_by_id(&mut tx, &id).await.unwrap();
        assert_eq!(rota.name, "On Call");
        assert_eq!(rota.metadata.frequency, RotaFrequency::Monthly);
        assert_eq!(rota.metadata.scheduling, RotaSchedule::Random);
        // Members were not in the payload, so they are left alone.
        assert_eq!(
            rotas::list_member_user_ids(&mut tx, &id).await.unwrap(),
            users(&["U1"])
        );
    }

    #[tokio::test]
    async fn test_submit_for_deleted_rota_is_not_found() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let (ctx, _slack) = context();

        let mut state = submitted("On Call", &[]);
        state.rota_id = "gone".to_string();
        let err = SaveRota::new(state).on_submit(&ctx, &mut tx).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_render_opens_modal() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let (ctx, slack) = context();

        let view = SaveRota::new(SaveRotaState {
            trigger_id: "trigger".to_string(),
            channel_id: "C1".to_string(),
            ..SaveRota::default_state()
        });
        let props = view.build_props(&mut tx).await.unwrap();
        view.render(&ctx, props).await.unwrap();

        let calls = slack.calls();
        let SlackCall::Open { trigger_id, view } = &calls[0] else {
            panic!("expected views.open, got {:?}", calls[0]);
        };
        assert_eq!(trigger_id, "trigger");
        assert_eq!(view.callback_id, "SaveRota");
        assert_eq!(view.close.as_ref().unwrap().text, "Cancel");
        assert_eq!(view.private_metadata, r#"{"rota_id":"","channel_id":"C1"}"#);
    }

    #[tokio::test]
    async fn test_action_and_close_acknowledge() {
        let (repo, _temp_dir) = repository().await;
        let mut tx = repo.begin().await.unwrap();
        let (ctx, _slack) = context();
        let view = SaveRota::new(SaveRota::default_state());

        assert_eq!(view.on_action(&ctx, &mut tx).await.unwrap(), ActionResponse::ack());
        assert_eq!(view.on_close(&ctx, &mut tx).await.unwrap(), ActionResponse::ack());
    }
}
