use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use shhh_bot::config::{Config, Transport};
use shhh_bot::log_chat::LogChatLayer;
use shhh_bot::quiet::{Action, QuietHours};
use shhh_bot::telegram::{inbound_event, TelegramClient};

struct BotState {
    quiet_hours: QuietHours,
    telegram: TelegramClient,
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "shhh.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::never(&log_dir, "shhh.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        );

    if let Some(log_chat_id) = config.log_chat_id {
        registry.with(LogChatLayer::new(bot.clone(), log_chat_id)).init();
    } else {
        registry.init();
    }

    let quiet_hours = QuietHours::with_system_clock(config.quiet_config());
    let quiet = quiet_hours.config();
    info!("🚀 Starting shhh-bot...");
    info!("Loaded config from {config_path}");
    info!(
        "Quiet hours {}–{} ({}), cooldown {}s",
        quiet.window.start.format("%H:%M"),
        quiet.window.end.format("%H:%M"),
        quiet.timezone.name(),
        quiet.cooldown.num_seconds()
    );
    if config.dry_run {
        info!("DRY RUN mode enabled");
    }

    let telegram = TelegramClient::new(bot.clone());
    telegram.log_identity().await;

    let state = Arc::new(BotState {
        quiet_hours,
        telegram,
        dry_run: config.dry_run,
    });

    let handler = dptree::entry().endpoint(handle_update);

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build();

    match config.transport {
        Transport::Polling => {
            info!("Receiving updates by long polling");
            dispatcher.dispatch().await;
        }
        Transport::Webhook { url, listen_addr } => {
            info!("Receiving updates by webhook at {url} (listening on {listen_addr})");
            let listener = match webhooks::axum(bot, webhooks::Options::new(listen_addr, url)).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("Failed to set up webhook: {e}");
                    std::process::exit(1);
                }
            };
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Webhook listener error"),
                )
                .await;
        }
    }
}

async fn handle_update(update: Update, state: Arc<BotState>) -> ResponseResult<()> {
    let event = inbound_event(&update);

    let Action::SendReminder { chat_id, reply_to, text } = state.quiet_hours.on_message(&event) else {
        return Ok(());
    };

    if state.dry_run {
        info!(chat_id, "[DRY RUN] Would send reminder");
        return Ok(());
    }

    // The cooldown is already reserved; a failed send is not retried
    match state.telegram.send_message(chat_id, &text, reply_to).await {
        Ok(_) => info!(chat_id, "Reminder sent"),
        Err(e) => warn!(chat_id, "Reminder not delivered: {e}"),
    }

    Ok(())
}
