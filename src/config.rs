//! # Dashboard Configuration Module
//!
//! This module defines the runtime configuration of the bot: credentials,
//! the destination channel, the admin allow-list and library settings.
//! Values come from the process environment (optionally seeded from a
//! `.env` file by `main`).

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use teloxide::types::{ChatId, Recipient};

use crate::library::RandomContentPolicy;

// Constants for dashboard configuration
pub const DEFAULT_LIBRARY_DIR: &str = ".";
pub const DEFAULT_DIALOGUE_TIMEOUT_SECS: u64 = 300; // 5 minutes to finish a guided dialog
pub const MAX_IMAGE_DOWNLOAD_BYTES: u32 = 20 * 1024 * 1024; // Bot API getFile limit

// Environment variable names
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHANNEL_ID: &str = "CHANNEL_ID";
pub const ENV_ADMIN_IDS: &str = "ADMIN_IDS";
pub const ENV_LIBRARY_DIR: &str = "LIBRARY_DIR";
pub const ENV_DIALOGUE_TIMEOUT: &str = "DIALOGUE_TIMEOUT_SECS";
pub const ENV_RANDOM_CONTENT_POLICY: &str = "RANDOM_CONTENT_POLICY";

/// Configuration structure for the dashboard bot
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Telegram Bot API token
    pub bot_token: String,
    /// Destination channel, numeric id or `@username`
    pub channel: Recipient,
    /// Authorized user ids; empty means open access
    pub admin_ids: Vec<i64>,
    /// Directory holding `images/` and `posts/`
    pub library_dir: PathBuf,
    /// Idle time after which a guided dialog is discarded
    pub dialogue_timeout: Duration,
    /// How random content is assembled when both kinds exist
    pub random_content_policy: RandomContentPolicy,
}

impl DashboardConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup(ENV_BOT_TOKEN)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("{ENV_BOT_TOKEN} must be set"))?;

        let channel_raw = lookup(ENV_CHANNEL_ID)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("{ENV_CHANNEL_ID} must be set"))?;
        let channel = parse_channel(&channel_raw)
            .with_context(|| format!("Invalid {ENV_CHANNEL_ID}"))?;

        let admin_ids = match lookup(ENV_ADMIN_IDS) {
            Some(raw) => parse_admin_ids(&raw).with_context(|| format!("Invalid {ENV_ADMIN_IDS}"))?,
            None => Vec::new(),
        };

        let library_dir = lookup(ENV_LIBRARY_DIR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_DIR));

        let timeout_secs = match lookup(ENV_DIALOGUE_TIMEOUT) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {ENV_DIALOGUE_TIMEOUT}: {raw}"))?,
            None => DEFAULT_DIALOGUE_TIMEOUT_SECS,
        };

        let random_content_policy = match lookup(ENV_RANDOM_CONTENT_POLICY) {
            Some(raw) => raw
                .parse::<RandomContentPolicy>()
                .map_err(|e| anyhow!("Invalid {ENV_RANDOM_CONTENT_POLICY}: {e}"))?,
            None => RandomContentPolicy::default(),
        };

        Ok(Self {
            bot_token,
            channel,
            admin_ids,
            library_dir,
            dialogue_timeout: Duration::from_secs(timeout_secs),
            random_content_policy,
        })
    }
}

/// Parse a channel reference: a numeric chat id or an `@username`
pub fn parse_channel(raw: &str) -> Result<Recipient> {
    let trimmed = raw.trim();

    if let Ok(id) = trimmed.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }

    if let Some(name) = trimmed.strip_prefix('@') {
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Ok(Recipient::ChannelUsername(trimmed.to_string()));
        }
    }

    Err(anyhow!("expected a numeric chat id or @username, got '{trimmed}'"))
}

/// Parse the admin allow-list.
///
/// Ids may be separated by commas, semicolons or whitespace. A token that
/// is not an integer is an error, since dropping it could silently turn a
/// restricted dashboard into an open one.
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .with_context(|| format!("'{token}' is not a user id"))
        })
        .collect()
}
