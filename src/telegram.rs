//! Telegram transport using teloxide.

use teloxide::prelude::*;
use teloxide::types::{Chat, MessageId, ReplyParameters, UpdateKind, User};
use tracing::{info, warn};

use crate::quiet::{ChatInfo, ChatKind, InboundEvent, IncomingMessage, SenderInfo};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send plain text, optionally as a reply. Returns the new message id.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);

        if let Some(msg_id) = reply_to_message_id {
            // The triggering message may already be deleted; post the reminder anyway
            let reply_params =
                ReplyParameters::new(MessageId(msg_id as i32)).allow_sending_without_reply();
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send to chat {chat_id}: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Log the bot's identity. Failure only means the token is suspect.
    pub async fn log_identity(&self) {
        match self.bot.get_me().await {
            Ok(me) => info!("Bot user ID: {}, username: @{}", me.id, me.username()),
            Err(e) => warn!("Failed to get bot info: {e}"),
        }
    }
}

/// Convert a Telegram update into the core's event type.
pub fn inbound_event(update: &Update) -> InboundEvent {
    match &update.kind {
        UpdateKind::Message(msg) => InboundEvent::message(incoming_message(msg)),
        _ => InboundEvent::without_message(),
    }
}

fn incoming_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        message_id: msg.id.0 as i64,
        chat: chat_info(&msg.chat),
        sender: msg.from.as_ref().map(sender_info),
    }
}

fn chat_info(chat: &Chat) -> ChatInfo {
    let kind = if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_group() {
        ChatKind::Group
    } else if chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Private
    };

    ChatInfo {
        id: chat.id.0,
        kind,
        title: chat.title().map(str::to_string),
    }
}

fn sender_info(user: &User) -> SenderInfo {
    let display_name = match user.username {
        Some(ref username) => format!("{} (@{})", user.full_name(), username),
        None => user.full_name(),
    };

    SenderInfo {
        user_id: user.id.0 as i64,
        display_name,
        is_bot: user.is_bot,
    }
}
