//! # Dashboard Controller
//!
//! Menu state machine behind the Telegram handlers. Every entry point takes
//! the calling user, performs the requested action against the media
//! library or the channel, and returns a [`Reply`] already formatted by
//! `bot::ui_builder` for the handlers to send. Failures are rendered into the reply; nothing here returns an
//! error to the caller.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::InlineKeyboardMarkup;
use tracing::{debug, info, warn};

use crate::admin::AdminGate;
use crate::bot::ui_builder::{
    append_cancel_hint, create_back_keyboard, create_root_menu_keyboard, format_contents_list,
    format_dialog_prompt, format_error, format_help, format_root_menu, format_stats,
};
use crate::dialogue::{validate_post_text, DashboardSessions, DialogState, MAX_POST_CHARS};
use crate::errors::{ContentKind, DashboardError};
use crate::library::{MediaLibrary, RandomContent};
use crate::localization::{t_args_lang, t_lang};
use crate::publisher::ChannelPublisher;

/// Buttons of the dashboard, carried as callback data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardAction {
    Stats,
    SendImage,
    SendPost,
    AddImage,
    AddPost,
    ListContents,
    RandomContent,
    Close,
    Back,
}

impl DashboardAction {
    pub const ALL: [DashboardAction; 9] = [
        DashboardAction::Stats,
        DashboardAction::SendImage,
        DashboardAction::SendPost,
        DashboardAction::AddImage,
        DashboardAction::AddPost,
        DashboardAction::ListContents,
        DashboardAction::RandomContent,
        DashboardAction::Close,
        DashboardAction::Back,
    ];

    /// Callback data identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardAction::Stats => "stats",
            DashboardAction::SendImage => "send_image",
            DashboardAction::SendPost => "send_post",
            DashboardAction::AddImage => "add_image",
            DashboardAction::AddPost => "add_post",
            DashboardAction::ListContents => "list_contents",
            DashboardAction::RandomContent => "random_content",
            DashboardAction::Close => "close",
            DashboardAction::Back => "back",
        }
    }

    /// Translation key of the button label
    pub fn label_key(&self) -> &'static str {
        match self {
            DashboardAction::Stats => "button-stats",
            DashboardAction::SendImage => "button-send-image",
            DashboardAction::SendPost => "button-send-post",
            DashboardAction::AddImage => "button-add-image",
            DashboardAction::AddPost => "button-add-post",
            DashboardAction::ListContents => "button-list-contents",
            DashboardAction::RandomContent => "button-random-content",
            DashboardAction::Close => "button-close",
            DashboardAction::Back => "button-back",
        }
    }
}

impl FromStr for DashboardAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DashboardAction::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown dashboard action '{s}'"))
    }
}

/// The Telegram user behind an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub language_code: Option<String>,
}

impl Caller {
    pub fn new(user_id: i64, language_code: Option<&str>) -> Self {
        Self {
            user_id,
            language_code: language_code.map(str::to_string),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language_code.as_deref()
    }
}

/// A rendered answer to the admin
#[derive(Debug, Clone)]
pub struct Reply {
    /// HTML message text
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
    /// Set when the caller is not an admin
    pub denied: bool,
}

impl Reply {
    pub fn text(text: String) -> Self {
        Self {
            text,
            keyboard: None,
            denied: false,
        }
    }

    pub fn with_keyboard(text: String, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text,
            keyboard: Some(keyboard),
            denied: false,
        }
    }

    fn with_back(text: String, language_code: Option<&str>) -> Self {
        Self::with_keyboard(text, create_back_keyboard(language_code))
    }

    fn denied(language_code: Option<&str>) -> Self {
        Self {
            text: t_lang("access-denied", language_code),
            keyboard: None,
            denied: true,
        }
    }
}

pub struct DashboardController {
    library: MediaLibrary,
    gate: AdminGate,
    publisher: Arc<dyn ChannelPublisher>,
    sessions: DashboardSessions,
}

impl DashboardController {
    pub fn new(
        library: MediaLibrary,
        gate: AdminGate,
        publisher: Arc<dyn ChannelPublisher>,
        dialogue_timeout: Duration,
    ) -> Self {
        Self {
            library,
            gate,
            publisher,
            sessions: DashboardSessions::new(dialogue_timeout),
        }
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    pub fn is_authorized(&self, caller: &Caller) -> bool {
        self.gate.is_authorized(caller.user_id)
    }

    pub async fn dialog_state(&self, caller: &Caller) -> DialogState {
        self.sessions.state(caller.user_id).await
    }

    /// `/dashboard`: render the root menu, discarding any active dialog
    pub async fn open_dashboard(&self, caller: &Caller) -> Reply {
        let lang = caller.language();
        if !self.is_authorized(caller) {
            info!(user_id = caller.user_id, "Unauthorized dashboard request");
            return self.deny(caller);
        }

        self.sessions.finish(caller.user_id).await;
        debug!(user_id = caller.user_id, "Opening dashboard");
        root_menu(lang)
    }

    /// `/cancel`: abort the add-image or add-post dialog
    pub async fn cancel(&self, caller: &Caller) -> Reply {
        let lang = caller.language();
        if !self.is_authorized(caller) {
            return self.deny(caller);
        }

        match self.sessions.finish(caller.user_id).await {
            DialogState::Idle => Reply::text(t_lang("nothing-to-cancel", lang)),
            previous => {
                info!(user_id = caller.user_id, state = ?previous, "Dialog cancelled");
                Reply::with_back(t_lang("dialog-cancelled", lang), lang)
            }
        }
    }

    /// Access-denied answer for a caller outside the allow-list
    pub fn deny(&self, caller: &Caller) -> Reply {
        failure(&DashboardError::Unauthorized(caller.user_id), caller.language())
    }

    pub fn help(&self, caller: &Caller) -> Reply {
        Reply::text(format_help(caller.language()))
    }

    /// Handle a dashboard button press
    pub async fn handle_action(&self, caller: &Caller, action: DashboardAction) -> Reply {
        let lang = caller.language();
        if !self.is_authorized(caller) {
            info!(user_id = caller.user_id, action = action.as_str(), "Unauthorized button press");
            return self.deny(caller);
        }

        info!(user_id = caller.user_id, action = action.as_str(), "Dashboard action");

        // Any button press leaves a pending dialog
        self.sessions.finish(caller.user_id).await;

        match action {
            DashboardAction::Stats => self.show_stats(lang).await,
            DashboardAction::SendImage => self.send_random_image(lang).await,
            DashboardAction::SendPost => self.send_random_post(lang).await,
            DashboardAction::AddImage => {
                self.sessions
                    .begin(caller.user_id, DialogState::AwaitingImage)
                    .await;
                Reply::text(format_dialog_prompt("add-image-prompt", lang))
            }
            DashboardAction::AddPost => {
                self.sessions
                    .begin(caller.user_id, DialogState::AwaitingPost)
                    .await;
                Reply::text(format_dialog_prompt("add-post-prompt", lang))
            }
            DashboardAction::ListContents => {
                let contents = self.library.list_contents();
                Reply::with_back(format_contents_list(&contents, lang), lang)
            }
            DashboardAction::RandomContent => self.send_random_content(lang).await,
            DashboardAction::Close => Reply::text(t_lang("dashboard-closed", lang)),
            DashboardAction::Back => root_menu(lang),
        }
    }

    /// Image bytes uploaded by an admin. `None` when no add-image dialog
    /// is active for the caller.
    pub async fn receive_image(&self, caller: &Caller, data: &[u8]) -> Option<Reply> {
        let lang = caller.language();
        if !self.is_authorized(caller)
            || self.sessions.state(caller.user_id).await != DialogState::AwaitingImage
        {
            return None;
        }

        if image::guess_format(data).is_err() {
            debug!(user_id = caller.user_id, bytes = data.len(), "Rejected non-image upload");
            return Some(Reply::text(format_dialog_prompt("image-invalid", lang)));
        }

        match self.library.add_image(data) {
            Ok(filename) => {
                self.sessions.finish(caller.user_id).await;
                Some(Reply::with_back(
                    t_args_lang("image-saved", &[("filename", &filename)], lang),
                    lang,
                ))
            }
            // The dialog stays open so the admin can resend
            Err(e) => {
                warn!(user_id = caller.user_id, error = %e, "Failed to store image");
                Some(Reply::text(append_cancel_hint(format_error(&e, lang), lang)))
            }
        }
    }

    /// Text sent by an admin. `None` when no dialog is active.
    pub async fn receive_text(&self, caller: &Caller, text: &str) -> Option<Reply> {
        let lang = caller.language();
        if !self.is_authorized(caller) {
            return None;
        }

        match self.sessions.state(caller.user_id).await {
            DialogState::Idle => None,
            DialogState::AwaitingImage => {
                Some(Reply::text(format_dialog_prompt("image-expected", lang)))
            }
            DialogState::AwaitingPost => Some(self.store_post(caller, text).await),
        }
    }

    /// Prompt of the active dialog, used when an admin sends something the
    /// dialog cannot accept
    pub async fn reprompt(&self, caller: &Caller) -> Option<Reply> {
        let lang = caller.language();
        if !self.is_authorized(caller) {
            return None;
        }

        match self.sessions.state(caller.user_id).await {
            DialogState::Idle => None,
            DialogState::AwaitingImage => {
                Some(Reply::text(format_dialog_prompt("image-expected", lang)))
            }
            DialogState::AwaitingPost => {
                Some(Reply::text(format_dialog_prompt("add-post-prompt", lang)))
            }
        }
    }

    async fn store_post(&self, caller: &Caller, text: &str) -> Reply {
        let lang = caller.language();

        let text = match validate_post_text(text) {
            Ok(text) => text,
            Err("too_long") => {
                return Reply::text(append_cancel_hint(
                    t_args_lang("post-too-long", &[("max", &MAX_POST_CHARS.to_string())], lang),
                    lang,
                ));
            }
            Err(_) => return Reply::text(format_dialog_prompt("post-empty", lang)),
        };

        match self.library.add_post(text) {
            Ok(filename) => {
                self.sessions.finish(caller.user_id).await;
                Reply::with_back(t_args_lang("post-saved", &[("filename", &filename)], lang), lang)
            }
            Err(e) => {
                warn!(user_id = caller.user_id, error = %e, "Failed to store post");
                Reply::text(append_cancel_hint(format_error(&e, lang), lang))
            }
        }
    }

    async fn show_stats(&self, lang: Option<&str>) -> Reply {
        match self.publisher.channel_info().await {
            Ok(info) => {
                let contents = self.library.list_contents();
                Reply::with_back(format_stats(&info, &contents, lang), lang)
            }
            Err(e) => failure(&e, lang),
        }
    }

    async fn send_random_image(&self, lang: Option<&str>) -> Reply {
        let Some(image) = self.library.get_random_image() else {
            return failure(&DashboardError::EmptyLibrary(ContentKind::Image), lang);
        };

        match self.publisher.send_photo(&image, None).await {
            Ok(()) => {
                info!(image = %image.display(), "Image sent to channel");
                Reply::with_back(t_lang("sent-image", lang), lang)
            }
            Err(e) => failure(&e, lang),
        }
    }

    async fn send_random_post(&self, lang: Option<&str>) -> Reply {
        let text = match self.library.get_random_post() {
            Ok(Some(text)) => text,
            Ok(None) => return failure(&DashboardError::EmptyLibrary(ContentKind::Post), lang),
            Err(e) => return failure(&e, lang),
        };

        match self.publisher.send_text(&text).await {
            Ok(()) => Reply::with_back(t_lang("sent-post", lang), lang),
            Err(e) => failure(&e, lang),
        }
    }

    async fn send_random_content(&self, lang: Option<&str>) -> Reply {
        if self.library.list_contents().is_empty() {
            return failure(&DashboardError::EmptyLibrary(ContentKind::Any), lang);
        }

        let content = match self.library.get_random_content() {
            Ok(content) => content,
            Err(e) => return failure(&e, lang),
        };

        let (result, sent_key) = match &content {
            RandomContent::ImageText { image, caption } => (
                self.publisher.send_photo(image, Some(caption)).await,
                "sent-random-image-text",
            ),
            RandomContent::ImageOnly(image) => (
                self.publisher.send_photo(image, None).await,
                "sent-random-image-only",
            ),
            RandomContent::TextOnly(text) => {
                (self.publisher.send_text(text).await, "sent-random-text-only")
            }
        };

        match result {
            Ok(()) => {
                info!(variant = content.variant_name(), "Random content sent to channel");
                Reply::with_back(t_lang(sent_key, lang), lang)
            }
            Err(e) => failure(&e, lang),
        }
    }
}

fn root_menu(lang: Option<&str>) -> Reply {
    Reply::with_keyboard(format_root_menu(lang), create_root_menu_keyboard(lang))
}

/// Render a failed action; the admin can press the same button again
fn failure(error: &DashboardError, lang: Option<&str>) -> Reply {
    let text = match error {
        DashboardError::EmptyLibrary(ContentKind::Image) => t_lang("empty-images", lang),
        DashboardError::EmptyLibrary(ContentKind::Post) => t_lang("empty-posts", lang),
        DashboardError::EmptyLibrary(ContentKind::Any) => t_lang("empty-library", lang),
        DashboardError::Unauthorized(user_id) => {
            debug!(user_id, "Access denied");
            return Reply::denied(lang);
        }
        DashboardError::Delivery(_) | DashboardError::Storage(_) => {
            warn!(error = %error, "Dashboard action failed");
            format_error(error, lang)
        }
    };
    Reply::with_back(text, lang)
}
