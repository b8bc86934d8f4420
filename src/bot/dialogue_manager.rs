//! Dialogue Manager module for feeding guided dialog input to the controller

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::{debug, error, info};

use crate::config::MAX_IMAGE_DOWNLOAD_BYTES;
use crate::dashboard::{Caller, DashboardController, Reply};
use crate::localization::t_args_lang;

use super::message_handler::send_reply;
use super::ui_builder::append_cancel_hint;

/// Download a Telegram file into memory
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url)
        .await
        .context("Failed to request file")?
        .error_for_status()
        .context("File download rejected")?;
    let bytes = response.bytes().await.context("Failed to read file body")?;

    Ok(bytes.to_vec())
}

/// The uploaded image of a message: the largest photo size, or a document
/// with an `image/*` MIME type
fn image_attachment(msg: &Message) -> Option<(FileId, u32)> {
    if let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) {
        return Some((largest_photo.file.id.clone(), largest_photo.file.size));
    }

    let doc = msg.document()?;
    let is_image = doc
        .mime_type
        .as_ref()
        .map(|mime_type| mime_type.to_string().starts_with("image/"))
        .unwrap_or(false);
    if is_image {
        Some((doc.file.id.clone(), doc.file.size))
    } else {
        debug!(user_id = %msg.chat.id, mime_type = ?doc.mime_type, "Received non-image document");
        None
    }
}

/// Handle a message while the admin is adding an image
pub async fn handle_image_upload(
    bot: &Bot,
    msg: &Message,
    controller: &DashboardController,
    caller: &Caller,
) -> Result<()> {
    let lang = caller.language();

    let Some((file_id, size)) = image_attachment(msg) else {
        let reply = match msg.text() {
            Some(text) => controller.receive_text(caller, text).await,
            None => controller.reprompt(caller).await,
        };
        if let Some(reply) = reply {
            send_reply(bot, msg.chat.id, reply).await?;
        }
        return Ok(());
    };

    if size > MAX_IMAGE_DOWNLOAD_BYTES {
        info!(user_id = caller.user_id, size, "Rejected oversized image");
        let max_mb = (MAX_IMAGE_DOWNLOAD_BYTES / (1024 * 1024)).to_string();
        let text = append_cancel_hint(
            t_args_lang("image-too-large", &[("max_mb", &max_mb)], lang),
            lang,
        );
        return send_reply(bot, msg.chat.id, Reply::text(text)).await;
    }

    let data = match download_file(bot, file_id).await {
        Ok(data) => data,
        Err(e) => {
            error!(user_id = caller.user_id, error = %e, "Failed to download image");
            let error_text = teloxide::utils::html::escape(&e.to_string());
            let text = append_cancel_hint(
                t_args_lang("image-download-failed", &[("error", &error_text)], lang),
                lang,
            );
            return send_reply(bot, msg.chat.id, Reply::text(text)).await;
        }
    };
    debug!(user_id = caller.user_id, bytes = data.len(), "Image downloaded");

    if let Some(reply) = controller.receive_image(caller, &data).await {
        send_reply(bot, msg.chat.id, reply).await?;
    }

    Ok(())
}

/// Handle a message while the admin is adding a post
pub async fn handle_post_input(
    bot: &Bot,
    msg: &Message,
    controller: &DashboardController,
    caller: &Caller,
) -> Result<()> {
    let reply = match msg.text() {
        Some(text) => controller.receive_text(caller, text).await,
        None => controller.reprompt(caller).await,
    };

    if let Some(reply) = reply {
        send_reply(bot, msg.chat.id, reply).await?;
    }

    Ok(())
}
