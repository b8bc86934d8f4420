//! Channel publishing surface
//!
//! The dashboard only talks to the destination channel through
//! [`ChannelPublisher`], so delivery failures come back as values and the
//! controller can be exercised without a live bot.

use async_trait::async_trait;
use std::borrow::Cow;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Recipient};
use tracing::{debug, error};

use crate::errors::DashboardError;

/// Telegram caption limit in characters
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Channel details shown on the stats screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub member_count: u32,
}

#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Send a photo, optionally captioned
    async fn send_photo(&self, image: &Path, caption: Option<&str>) -> Result<(), DashboardError>;

    /// Send a plain text message
    async fn send_text(&self, text: &str) -> Result<(), DashboardError>;

    /// Look up the channel and its member count
    async fn channel_info(&self) -> Result<ChannelInfo, DashboardError>;
}

/// Publisher backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramPublisher {
    bot: Bot,
    channel: Recipient,
}

impl TelegramPublisher {
    pub fn new(bot: Bot, channel: Recipient) -> Self {
        Self { bot, channel }
    }
}

#[async_trait]
impl ChannelPublisher for TelegramPublisher {
    async fn send_photo(&self, image: &Path, caption: Option<&str>) -> Result<(), DashboardError> {
        debug!(image = %image.display(), captioned = caption.is_some(), "Sending photo to channel");

        let mut request = self
            .bot
            .send_photo(self.channel.clone(), InputFile::file(image.to_path_buf()));
        if let Some(caption) = caption {
            request = request.caption(clip_caption(caption).into_owned());
        }

        request.await.map_err(|e| {
            error!(image = %image.display(), error = %e, "Failed to send photo to channel");
            DashboardError::from(e)
        })?;
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), DashboardError> {
        debug!(chars = text.chars().count(), "Sending text to channel");

        self.bot
            .send_message(self.channel.clone(), text)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send text to channel");
                DashboardError::from(e)
            })?;
        Ok(())
    }

    async fn channel_info(&self) -> Result<ChannelInfo, DashboardError> {
        let chat = self.bot.get_chat(self.channel.clone()).await?;
        let member_count = self.bot.get_chat_member_count(self.channel.clone()).await?;

        Ok(ChannelInfo {
            id: chat.id.0,
            title: chat.title().map(str::to_string),
            description: chat.description().map(str::to_string),
            member_count,
        })
    }
}

/// Clip a caption to the Telegram limit, ending with an ellipsis
pub fn clip_caption(caption: &str) -> Cow<'_, str> {
    if caption.chars().count() <= MAX_CAPTION_CHARS {
        return Cow::Borrowed(caption);
    }

    let mut clipped: String = caption.chars().take(MAX_CAPTION_CHARS - 1).collect();
    clipped.push('…');
    Cow::Owned(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_caption_untouched() {
        assert!(matches!(clip_caption("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_long_caption_clipped_on_char_boundary() {
        let caption = "ب".repeat(MAX_CAPTION_CHARS + 10);
        let clipped = clip_caption(&caption);
        assert_eq!(clipped.chars().count(), MAX_CAPTION_CHARS);
        assert!(clipped.ends_with('…'));
    }
}
