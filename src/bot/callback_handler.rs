//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ParseMode};
use tracing::{debug, warn};

use crate::dashboard::{Caller, DashboardAction, DashboardController};

/// Handle callback queries from the dashboard keyboard
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<DashboardController>,
) -> Result<()> {
    let caller = Caller::new(q.from.id.0 as i64, q.from.language_code.as_deref());
    debug!(user_id = caller.user_id, data = ?q.data, "Received callback query from user");

    let action = match q.data.as_deref().map(str::parse::<DashboardAction>) {
        Some(Ok(action)) => action,
        _ => {
            // Stale or foreign keyboard, just stop the loading state
            bot.answer_callback_query(q.id).await?;
            return Ok(());
        }
    };

    let reply = controller.handle_action(&caller, action).await;

    if reply.denied {
        bot.answer_callback_query(q.id)
            .text(reply.text)
            .show_alert(true)
            .await?;
        return Ok(());
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    let Some(message) = &q.message else {
        return Ok(());
    };

    let mut request = bot
        .edit_message_text(message.chat().id, message.id(), reply.text)
        .parse_mode(ParseMode::Html);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }

    // Editing fails when the rendered screen is unchanged; the admin already
    // got the callback answer, so only log it
    if let Err(e) = request.await {
        warn!(user_id = caller.user_id, action = action.as_str(), error = %e, "Failed to edit dashboard message");
    }

    Ok(())
}
