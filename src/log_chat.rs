//! Tracing layer that mirrors log events into a Telegram chat.

use std::fmt::Write as _;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Telegram rejects messages longer than 4096 chars.
const MAX_MESSAGE_CHARS: usize = 4000;
const FLUSH_INTERVAL: Duration = Duration::from_secs(5);
const MAX_BUFFERED: usize = 50;

enum LogLine {
    /// WARN/ERROR - forwarded right away
    Urgent(String),
    /// INFO - batched
    Routine(String),
}

pub struct LogChatLayer {
    tx: mpsc::UnboundedSender<LogLine>,
}

impl LogChatLayer {
    /// Must be called inside a tokio runtime.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward(bot, chat_id, rx));
        Self { tx }
    }
}

async fn forward(bot: Bot, chat_id: ChatId, mut rx: mpsc::UnboundedReceiver<LogLine>) {
    let mut pending: Vec<String> = Vec::new();
    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);

    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(LogLine::Urgent(text)) => post(&bot, chat_id, &text).await,
                Some(LogLine::Routine(text)) => {
                    pending.push(text);
                    if pending.len() >= MAX_BUFFERED {
                        flush(&bot, chat_id, &mut pending).await;
                    }
                }
                None => {
                    flush(&bot, chat_id, &mut pending).await;
                    break;
                }
            },
            _ = ticker.tick() => flush(&bot, chat_id, &mut pending).await,
        }
    }
}

async fn flush(bot: &Bot, chat_id: ChatId, pending: &mut Vec<String>) {
    if pending.is_empty() {
        return;
    }
    let combined = pending.join("\n");
    pending.clear();
    post(bot, chat_id, &combined).await;
}

async fn post(bot: &Bot, chat_id: ChatId, text: &str) {
    let text = truncate(text);
    // Can't log through tracing here without feeding the layer again
    if let Err(e) = bot.send_message(chat_id, text).await {
        eprintln!("Failed to forward log to chat {chat_id}: {e}");
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Collects the message and any structured fields as `msg key=value ...`.
#[derive(Default)]
struct LineBuilder {
    message: String,
    fields: String,
}

impl Visit for LineBuilder {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl LineBuilder {
    fn finish(self) -> String {
        format!("{}{}", self.message, self.fields)
    }
}

fn format_line(level: Level, body: String) -> Option<LogLine> {
    match level {
        Level::ERROR => Some(LogLine::Urgent(format!("❌ {body}"))),
        Level::WARN => Some(LogLine::Urgent(format!("⚠️ {body}"))),
        Level::INFO => Some(LogLine::Routine(body)),
        _ => None,
    }
}

impl<S: Subscriber> Layer<S> for LogChatLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::INFO {
            return;
        }

        let mut builder = LineBuilder::default();
        event.record(&mut builder);

        if let Some(line) = format_line(level, builder.finish()) {
            if self.tx.send(line).is_err() {
                eprintln!("Log forwarder stopped, message dropped");
            }
        }
    }
}
