//! Per-chat reminder cooldown.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Atomic check-and-record of a reminder slot for a chat.
pub trait CooldownGate: Send + Sync {
    /// Returns `true` and records `now` iff the chat has no previous reminder
    /// or the cooldown has fully elapsed since it. Otherwise leaves state untouched.
    fn try_reserve(&self, chat_id: i64, now: DateTime<Tz>) -> bool;
}

/// In-memory gate. One lock guards the whole map, so reserving is a single
/// critical section for every chat.
#[derive(Debug)]
pub struct ReminderGate {
    cooldown: Duration,
    /// Last reminder instant per chat id. Entries are overwritten, never removed.
    last_sent: Mutex<HashMap<i64, DateTime<Tz>>>,
}

impl ReminderGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Last recorded reminder for a chat, if any.
    pub fn last_reminder(&self, chat_id: i64) -> Option<DateTime<Tz>> {
        self.last_sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&chat_id)
            .copied()
    }

    pub fn tracked_chats(&self) -> usize {
        self.last_sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl CooldownGate for ReminderGate {
    fn try_reserve(&self, chat_id: i64, now: DateTime<Tz>) -> bool {
        // A poisoned map is still consistent: every write is a single insert.
        let mut last_sent = self.last_sent.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(last) = last_sent.get(&chat_id) {
            // Negative elapsed (clock went backwards) never satisfies the cooldown.
            let elapsed = now.signed_duration_since(*last);
            if elapsed < self.cooldown || elapsed < Duration::zero() {
                return false;
            }
        }

        last_sent.insert(chat_id, now);
        true
    }
}
