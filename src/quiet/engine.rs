//! Quiet-hours engine - turns inbound events into reminder decisions.

use std::sync::Arc;

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::quiet::admission::{admit, Admission};
use crate::quiet::clock::{Clock, SystemClock};
use crate::quiet::event::InboundEvent;
use crate::quiet::gate::{CooldownGate, ReminderGate};
use crate::quiet::window::QuietWindow;

/// Immutable settings for the decision core, fixed at startup.
#[derive(Debug, Clone)]
pub struct QuietConfig {
    pub window: QuietWindow,
    pub timezone: Tz,
    /// Minimum spacing between two reminders in the same chat.
    pub cooldown: Duration,
    pub reminder_text: String,
}

impl QuietConfig {
    /// Builds the config, substituting `{start}` and `{end}` in the text.
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        timezone: Tz,
        cooldown: Duration,
        reminder_text: &str,
    ) -> Self {
        let reminder_text = reminder_text
            .replace("{start}", &start.format("%H:%M").to_string())
            .replace("{end}", &end.format("%H:%M").to_string());

        Self {
            window: QuietWindow::new(start, end),
            timezone,
            cooldown,
            reminder_text,
        }
    }
}

/// Why no reminder goes out for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Rejected(Admission),
    OutsideQuietHours,
    Cooldown,
}

/// What the transport should do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Skip(SkipReason),
    SendReminder {
        chat_id: i64,
        /// Message the reminder replies to.
        reply_to: Option<i64>,
        text: String,
    },
}

/// The decision core. Shared between handler tasks via `Arc`.
pub struct QuietHours {
    config: QuietConfig,
    gate: Arc<dyn CooldownGate>,
    clock: Arc<dyn Clock>,
}

impl QuietHours {
    /// In-memory gate built from `config.cooldown`.
    pub fn new(config: QuietConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_gate(config, clock, |cooldown| Arc::new(ReminderGate::new(cooldown)))
    }

    /// Custom gate. `build_gate` receives the configured cooldown, so the
    /// config stays the only place the interval is set.
    pub fn with_gate<F>(config: QuietConfig, clock: Arc<dyn Clock>, build_gate: F) -> Self
    where
        F: FnOnce(Duration) -> Arc<dyn CooldownGate>,
    {
        let gate = build_gate(config.cooldown);
        Self { config, gate, clock }
    }

    /// In-memory gate and wall clock in the configured timezone.
    pub fn with_system_clock(config: QuietConfig) -> Self {
        let clock = Arc::new(SystemClock::new(config.timezone));
        Self::new(config, clock)
    }

    pub fn config(&self) -> &QuietConfig {
        &self.config
    }

    pub fn on_message(&self, event: &InboundEvent) -> Action {
        let (admission, message) = admit(event);
        let Some(message) = message else {
            debug!(?admission, "Event not admitted");
            return Action::Skip(SkipReason::Rejected(admission));
        };

        // Window and cooldown are always judged in the configured zone
        let now = self.clock.now().with_timezone(&self.config.timezone);
        if !self.config.window.contains(&now) {
            return Action::Skip(SkipReason::OutsideQuietHours);
        }

        let chat_id = message.chat.id;
        let sender = message
            .sender
            .as_ref()
            .map(|s| s.display_name.as_str())
            .unwrap_or("unknown");
        info!(
            chat_id,
            chat_title = message.chat.title.as_deref().unwrap_or(""),
            sender,
            "🌙 Quiet time message at {}",
            now.format("%H:%M")
        );

        if !self.gate.try_reserve(chat_id, now) {
            info!(chat_id, "Reminder suppressed by cooldown");
            return Action::Skip(SkipReason::Cooldown);
        }

        debug!(chat_id, "Reminder reserved");
        Action::SendReminder {
            chat_id,
            reply_to: Some(message.message_id),
            text: self.config.reminder_text.clone(),
        }
    }
}
