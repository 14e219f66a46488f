//! Slack integration: Block Kit types, UI builders and the Web API client.

pub mod blocks;
mod client;
mod error;
mod types;

pub use client::*;
pub use error::*;
pub use types::*;

#[cfg(test)]
pub(crate) mod testing;
