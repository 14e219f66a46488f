//! Data models for the Rotabot backend.
//!
//! Rota types mirror the persisted rows; interaction types mirror the JSON Slack sends us.

mod interaction;
mod rota;

pub use interaction::*;
pub use rota::*;
