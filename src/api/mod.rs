//! Slack callback endpoints.
//!
//! Every route here lives under `/slack` and is only reached once the request
//! signature has been verified.

mod actions;
mod commands;
mod events;

pub use actions::*;
pub use commands::*;
pub use events::*;

use crate::views::ViewContext;
use crate::AppState;

impl AppState {
    pub(crate) fn view_context(&self) -> ViewContext {
        ViewContext {
            slack: self.slack.clone(),
        }
    }
}
