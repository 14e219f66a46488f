//! In-memory `SlackApi` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ModalView, SlackApi, SlackError};

#[derive(Debug, Clone, PartialEq)]
pub enum SlackCall {
    Open {
        trigger_id: String,
        view: ModalView,
    },
    Push {
        trigger_id: String,
        view: ModalView,
    },
    Update {
        view_id: String,
        external_id: Option<String>,
        view: ModalView,
    },
}

impl SlackCall {
    pub fn view(&self) -> &ModalView {
        match self {
            SlackCall::Open { view, .. }
            | SlackCall::Push { view, .. }
            | SlackCall::Update { view, .. } => view,
        }
    }
}

/// Records every call; optionally fails them all.
#[derive(Debug, Default)]
pub struct RecordingSlack {
    calls: Mutex<Vec<SlackCall>>,
    fail_with: Option<String>,
}

impl RecordingSlack {
    pub fn failing(error: &str) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(error.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<SlackCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SlackCall) -> Result<(), SlackError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(error) => Err(SlackError::Api(error.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SlackApi for RecordingSlack {
    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError> {
        self.record(SlackCall::Open {
            trigger_id: trigger_id.to_string(),
            view: view.clone(),
        })
    }

    async fn push_view(&self, trigger_id: &str, view: &ModalView) -> Result<(), SlackError> {
        self.record(SlackCall::Push {
            trigger_id: trigger_id.to_string(),
            view: view.clone(),
        })
    }

    async fn update_view(
        &self,
        view: &ModalView,
        view_id: &str,
        external_id: Option<&str>,
    ) -> Result<(), SlackError> {
        self.record(SlackCall::Update {
            view_id: view_id.to_string(),
            external_id: external_id.map(str::to_string),
            view: view.clone(),
        })
    }
}
