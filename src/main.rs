use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use channel_dashboard::admin::AdminGate;
use channel_dashboard::bot::{self, Command};
use channel_dashboard::config::DashboardConfig;
use channel_dashboard::dashboard::DashboardController;
use channel_dashboard::library::MediaLibrary;
use channel_dashboard::publisher::TelegramPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting channel dashboard bot");

    let config = DashboardConfig::from_env().context("Failed to load configuration")?;

    let library =
        MediaLibrary::new(&config.library_dir).with_policy(config.random_content_policy);
    library
        .ensure_layout()
        .context("Failed to create library directories")?;
    info!(
        images = %library.images_dir().display(),
        posts = %library.posts_dir().display(),
        policy = library.policy().as_str(),
        "Media library ready"
    );

    let gate = AdminGate::new(config.admin_ids.iter().copied());
    if gate.is_open() {
        warn!("No admin allow-list configured, the dashboard is open to every user");
    } else {
        info!(admins = config.admin_ids.len(), "Admin allow-list loaded");
    }

    let bot = Bot::new(&config.bot_token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let publisher = Arc::new(TelegramPublisher::new(bot.clone(), config.channel.clone()));
    let controller = Arc::new(DashboardController::new(
        library,
        gate,
        publisher,
        config.dialogue_timeout,
    ));

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![controller])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
