//! shhh-bot - posts a quiet-hours reminder in Telegram groups.

pub mod config;
pub mod log_chat;
pub mod quiet;
pub mod telegram;
