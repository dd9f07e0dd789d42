//! Chat-bot front-end.
//!
//! Translates chat messages into feed and enrichment operations. The caller
//! is resolved through the external chat id stored on their account.

mod command;
mod handler;

pub use command::BotCommand;
pub use handler::{BotHandler, BotMessage};
