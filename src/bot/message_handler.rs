//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::debug;

use crate::dashboard::{Caller, DashboardController, Reply};
use crate::dialogue::DialogState;

// Import dialogue manager functions
use super::dialogue_manager::{handle_image_upload, handle_post_input};

/// Commands understood by the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Channel dashboard commands:")]
pub enum Command {
    #[command(description = "open the admin menu")]
    Dashboard,
    #[command(description = "abort adding an image or post")]
    Cancel,
    #[command(description = "show usage")]
    Help,
    #[command(hide)]
    Start,
}

/// Identify the sender of a message
pub fn caller_from_message(msg: &Message) -> Option<Caller> {
    msg.from
        .as_ref()
        .map(|user| Caller::new(user.id.0 as i64, user.language_code.as_deref()))
}

/// Send a rendered reply as a new HTML message
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<()> {
    let mut request = bot
        .send_message(chat_id, reply.text)
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }
    request.await?;
    Ok(())
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<DashboardController>,
) -> Result<()> {
    let Some(caller) = caller_from_message(&msg) else {
        return Ok(());
    };
    debug!(user_id = caller.user_id, command = ?cmd, "Received command from user");

    let reply = match cmd {
        Command::Dashboard => controller.open_dashboard(&caller).await,
        Command::Cancel => controller.cancel(&caller).await,
        Command::Help | Command::Start => controller.help(&caller),
    };

    send_reply(&bot, msg.chat.id, reply).await
}

/// Non-command messages: only meaningful while a guided dialog is active
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    controller: Arc<DashboardController>,
) -> Result<()> {
    let Some(caller) = caller_from_message(&msg) else {
        return Ok(());
    };

    if !controller.is_authorized(&caller) {
        // Only private chats get an answer
        if !msg.chat.is_private() {
            debug!(user_id = caller.user_id, "Ignoring group message from non-admin");
            return Ok(());
        }
        return send_reply(&bot, msg.chat.id, controller.deny(&caller)).await;
    }

    match controller.dialog_state(&caller).await {
        DialogState::AwaitingImage => handle_image_upload(&bot, &msg, &controller, &caller).await,
        DialogState::AwaitingPost => handle_post_input(&bot, &msg, &controller, &caller).await,
        DialogState::Idle => {
            debug!(user_id = caller.user_id, "Ignoring message outside of a dialog");
            Ok(())
        }
    }
}
