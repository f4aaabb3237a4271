//! Transport-independent view of an inbound update.

/// Kind of chat a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn is_group_like(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    /// Chat ID (negative = group, positive = DM).
    pub id: i64,
    pub kind: ChatKind,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderInfo {
    pub user_id: i64,
    pub display_name: String,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: ChatInfo,
    /// Absent for channel posts and some service messages.
    pub sender: Option<SenderInfo>,
}

/// One update from the messaging platform. `message` is `None` for updates
/// that carry no new message (edits, member changes, callbacks, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    pub message: Option<IncomingMessage>,
}

impl InboundEvent {
    pub fn without_message() -> Self {
        Self { message: None }
    }

    pub fn message(message: IncomingMessage) -> Self {
        Self {
            message: Some(message),
        }
    }
}
