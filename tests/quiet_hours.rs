//! End-to-end tests: config file -> decision core -> actions.
//!
//! Run with: cargo test --test quiet_hours

use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, TimeZone};
use shhh_bot::config::Config;
use shhh_bot::quiet::{
    Action, ChatInfo, ChatKind, FixedClock, InboundEvent, IncomingMessage, QuietHours, SenderInfo,
    SkipReason,
};
use tempfile::NamedTempFile;

fn load_config(json: &str) -> Config {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    Config::load_with_env_token(file.path(), None).expect("config should load")
}

fn message(chat_id: i64, kind: ChatKind, is_bot: bool) -> InboundEvent {
    InboundEvent::message(IncomingMessage {
        message_id: 10,
        chat: ChatInfo {
            id: chat_id,
            kind,
            title: Some("Night Owls".to_string()),
        },
        sender: Some(SenderInfo {
            user_id: 182736,
            display_name: "Bob".to_string(),
            is_bot,
        }),
    })
}

#[test]
fn test_configured_engine_follows_scenario() {
    let config = load_config(
        r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "timezone": "UTC",
            "quiet_start": "19:00",
            "quiet_end": "08:00",
            "min_reminder_interval_secs": 300,
            "reminder_text": "Quiet hours until {end}"
        }"#,
    );
    let quiet = config.quiet_config();

    let clock = Arc::new(FixedClock::new(
        quiet.timezone.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap(),
    ));
    let engine = QuietHours::new(quiet, clock.clone());

    let chat = -1001234567890;
    assert_eq!(
        engine.on_message(&message(chat, ChatKind::Supergroup, false)),
        Action::SendReminder {
            chat_id: chat,
            reply_to: Some(10),
            text: "Quiet hours until 08:00".to_string(),
        }
    );

    clock.advance(Duration::minutes(3));
    assert_eq!(
        engine.on_message(&message(chat, ChatKind::Supergroup, false)),
        Action::Skip(SkipReason::Cooldown)
    );

    clock.advance(Duration::minutes(3));
    assert!(matches!(
        engine.on_message(&message(chat, ChatKind::Supergroup, false)),
        Action::SendReminder { .. }
    ));

    clock.advance(Duration::hours(13));
    assert_eq!(
        engine.on_message(&message(chat, ChatKind::Supergroup, false)),
        Action::Skip(SkipReason::OutsideQuietHours)
    );
}

#[test]
fn test_window_evaluated_in_configured_timezone() {
    let config = load_config(
        r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "timezone": "Asia/Tbilisi",
            "quiet_start": "22:00",
            "quiet_end": "07:00"
        }"#,
    );
    let quiet = config.quiet_config();

    // Clock runs in UTC; 19:30 UTC is 23:30 in Tbilisi
    let clock = Arc::new(FixedClock::new(
        chrono_tz::UTC.with_ymd_and_hms(2026, 10, 19, 19, 30, 0).unwrap(),
    ));
    let engine = QuietHours::new(quiet, clock.clone());

    assert!(
        matches!(
            engine.on_message(&message(-42, ChatKind::Group, false)),
            Action::SendReminder { .. }
        ),
        "23:30 Tbilisi should be quiet"
    );

    // 17:30 UTC is 21:30 in Tbilisi, before the window opens
    clock.set(chrono_tz::UTC.with_ymd_and_hms(2026, 10, 19, 17, 30, 0).unwrap());
    assert_eq!(
        engine.on_message(&message(-43, ChatKind::Group, false)),
        Action::Skip(SkipReason::OutsideQuietHours)
    );
}

#[test]
fn test_ineligible_events_never_get_reminders() {
    let config = load_config(
        r#"{ "telegram_bot_token": "123456789:ABCdef", "timezone": "UTC" }"#,
    );
    let quiet = config.quiet_config();
    let clock = Arc::new(FixedClock::new(
        quiet.timezone.with_ymd_and_hms(2026, 10, 19, 23, 0, 0).unwrap(),
    ));
    let engine = QuietHours::new(quiet, clock);

    for event in [
        message(555, ChatKind::Private, false),
        message(-1, ChatKind::Channel, false),
        message(-1, ChatKind::Supergroup, true),
        InboundEvent::without_message(),
    ] {
        assert!(matches!(engine.on_message(&event), Action::Skip(SkipReason::Rejected(_))));
    }
}
