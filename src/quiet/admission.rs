use crate::quiet::event::{IncomingMessage, InboundEvent};

/// Outcome of the admission filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    NoMessage,
    NotGroup,
    NoSender,
    FromBot,
}

/// Decide whether an event is eligible for quiet-hours evaluation.
///
/// Returns the admitted message alongside the outcome so callers don't
/// have to unwrap the payload again.
pub fn admit(event: &InboundEvent) -> (Admission, Option<&IncomingMessage>) {
    let Some(message) = event.message.as_ref() else {
        return (Admission::NoMessage, None);
    };

    if !message.chat.kind.is_group_like() {
        return (Admission::NotGroup, None);
    }

    match message.sender {
        None => (Admission::NoSender, None),
        Some(ref sender) if sender.is_bot => (Admission::FromBot, None),
        Some(_) => (Admission::Admitted, Some(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiet::event::{ChatInfo, ChatKind, SenderInfo};

    fn event(kind: ChatKind, is_bot: bool) -> InboundEvent {
        InboundEvent::message(IncomingMessage {
            message_id: 7,
            chat: ChatInfo {
                id: -1001,
                kind,
                title: Some("Night Owls".to_string()),
            },
            sender: Some(SenderInfo {
                user_id: 42,
                display_name: "Alice".to_string(),
                is_bot,
            }),
        })
    }

    #[test]
    fn test_admits_humans_in_groups() {
        for kind in [ChatKind::Group, ChatKind::Supergroup] {
            let ev = event(kind, false);
            let (admission, message) = admit(&ev);
            assert_eq!(admission, Admission::Admitted);
            assert_eq!(message.map(|m| m.message_id), Some(7));
        }
    }

    #[test]
    fn test_rejects_non_group_chats() {
        for kind in [ChatKind::Private, ChatKind::Channel] {
            assert_eq!(admit(&event(kind, false)).0, Admission::NotGroup);
        }
    }

    #[test]
    fn test_rejects_bots() {
        assert_eq!(admit(&event(ChatKind::Supergroup, true)).0, Admission::FromBot);
    }

    #[test]
    fn test_rejects_missing_message() {
        assert_eq!(
            admit(&InboundEvent::without_message()),
            (Admission::NoMessage, None)
        );
    }

    #[test]
    fn test_rejects_missing_sender() {
        let mut ev = event(ChatKind::Group, false);
        if let Some(ref mut m) = ev.message {
            m.sender = None;
        }
        assert_eq!(admit(&ev).0, Admission::NoSender);
    }

    #[test]
    fn test_chat_kind_checked_before_sender() {
        // A bot in a DM is reported as a non-group rejection
        assert_eq!(admit(&event(ChatKind::Private, true)).0, Admission::NotGroup);
    }
}
