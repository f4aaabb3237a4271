//! Quiet-hours core - decides when a group chat gets a reminder.

pub mod admission;
pub mod clock;
pub mod engine;
pub mod event;
pub mod gate;
pub mod window;


pub use admission::{admit, Admission};
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{Action, QuietConfig, QuietHours, SkipReason};
pub use event::{ChatInfo, ChatKind, InboundEvent, IncomingMessage, SenderInfo};
pub use gate::{CooldownGate, ReminderGate};
pub use window::{is_quiet, parse_time_of_day, QuietWindow};
