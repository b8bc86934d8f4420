//! UI Builder module for creating keyboards and formatting messages
//!
//! Every message built here is HTML; dynamic values are escaped before they
//! are placed into a template.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html::escape;

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::dashboard::DashboardAction;
use crate::errors::DashboardError;
use crate::library::LibraryContents;
use crate::publisher::ChannelInfo;

/// Number of filenames listed per section of the contents screen
pub const LIST_PREVIEW_LIMIT: usize = 10;

fn button(action: DashboardAction, language_code: Option<&str>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(t_lang(action.label_key(), language_code), action.as_str())
}

/// Create the root dashboard keyboard
pub fn create_root_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    use DashboardAction::*;

    let rows = vec![
        vec![button(Stats, language_code), button(ListContents, language_code)],
        vec![button(SendImage, language_code), button(SendPost, language_code)],
        vec![button(AddImage, language_code), button(AddPost, language_code)],
        vec![button(RandomContent, language_code)],
        vec![button(Close, language_code)],
    ];

    InlineKeyboardMarkup::new(rows)
}

/// Keyboard with a single button returning to the root menu
pub fn create_back_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(DashboardAction::Back, language_code)]])
}

pub fn format_root_menu(language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}",
        t_lang("menu-title", language_code),
        t_lang("menu-description", language_code)
    )
}

/// Format channel statistics together with library counts
pub fn format_stats(
    info: &ChannelInfo,
    contents: &LibraryContents,
    language_code: Option<&str>,
) -> String {
    let none = t_lang("stats-none", language_code);
    let title = escape(info.title.as_deref().unwrap_or(&none));
    let description = escape(
        info.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&none),
    );

    let mut lines = vec![
        t_lang("stats-title", language_code),
        String::new(),
        t_args_lang("stats-name", &[("title", &title)], language_code),
        t_args_lang("stats-id", &[("id", &info.id.to_string())], language_code),
        t_args_lang(
            "stats-members",
            &[("count", &info.member_count.to_string())],
            language_code,
        ),
        t_args_lang("stats-description", &[("description", &description)], language_code),
        String::new(),
        t_args_lang(
            "stats-library-images",
            &[("count", &contents.images_count.to_string())],
            language_code,
        ),
        t_args_lang(
            "stats-library-posts",
            &[("count", &contents.posts_count.to_string())],
            language_code,
        ),
    ];

    if let Some(latest) = contents.latest_timestamp() {
        lines.push(t_args_lang(
            "stats-last-added",
            &[("timestamp", &latest.format("%Y-%m-%d %H:%M:%S").to_string())],
            language_code,
        ));
    }

    lines.join("\n")
}

fn format_section(names: &[String], language_code: Option<&str>) -> String {
    if names.is_empty() {
        return t_lang("contents-empty-section", language_code);
    }

    let mut result = String::new();
    for name in names.iter().take(LIST_PREVIEW_LIMIT) {
        result.push_str(&format!("• <code>{}</code>\n", escape(name)));
    }

    if names.len() > LIST_PREVIEW_LIMIT {
        let remaining = (names.len() - LIST_PREVIEW_LIMIT).to_string();
        result.push_str(&t_args_lang("contents-more", &[("count", &remaining)], language_code));
    }

    result.trim_end().to_string()
}

/// Format the library listing, at most `LIST_PREVIEW_LIMIT` names per section
pub fn format_contents_list(contents: &LibraryContents, language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}\n{}\n\n{}\n{}",
        t_lang("contents-title", language_code),
        t_args_lang(
            "contents-images",
            &[("count", &contents.images_count.to_string())],
            language_code
        ),
        format_section(&contents.image_filenames, language_code),
        t_args_lang(
            "contents-posts",
            &[("count", &contents.posts_count.to_string())],
            language_code
        ),
        format_section(&contents.post_filenames, language_code),
    )
}

/// Render an error for the admin
pub fn format_error(error: &DashboardError, language_code: Option<&str>) -> String {
    t_args_lang(
        "error-generic",
        &[("error", &escape(&error.to_string()))],
        language_code,
    )
}

/// Append the cancel hint to a message sent during a guided dialog
pub fn append_cancel_hint(message: String, language_code: Option<&str>) -> String {
    format!("{}\n\n{}", message, t_lang("cancel-hint", language_code))
}

pub fn format_dialog_prompt(prompt_key: &str, language_code: Option<&str>) -> String {
    append_cancel_hint(t_lang(prompt_key, language_code), language_code)
}

pub fn format_help(language_code: Option<&str>) -> String {
    [
        t_lang("help-title", language_code),
        t_lang("help-description", language_code),
        format!(
            "{}\n{}\n{}",
            t_lang("help-dashboard", language_code),
            t_lang("help-cancel", language_code),
            t_lang("help-help", language_code)
        ),
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents_with(images: usize, posts: usize) -> LibraryContents {
        let image_filenames: Vec<String> = (0..images)
            .map(|i| format!("image_20240101_0000{:02}.jpg", i % 60))
            .collect();
        let post_filenames: Vec<String> = (0..posts)
            .map(|i| format!("post_20240101_0000{:02}.txt", i % 60))
            .collect();
        LibraryContents {
            images_count: image_filenames.len(),
            posts_count: post_filenames.len(),
            image_filenames,
            post_filenames,
        }
    }

    #[test]
    fn test_root_menu_has_eight_actions() {
        let keyboard = create_root_menu_keyboard(None);
        let buttons: Vec<_> = keyboard.inline_keyboard.iter().flatten().collect();
        assert_eq!(buttons.len(), 8);
    }

    #[test]
    fn test_contents_list_truncates() {
        let text = format_contents_list(&contents_with(12, 3), Some("en"));
        assert_eq!(text.matches(".jpg").count(), LIST_PREVIEW_LIMIT);
        assert_eq!(text.matches(".txt").count(), 3);
        assert!(text.contains("and 2 more"));
    }

    #[test]
    fn test_contents_list_empty_sections() {
        let text = format_contents_list(&LibraryContents::default(), Some("en"));
        assert_eq!(text.matches("(none)").count(), 2);
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_stats_escapes_channel_fields() {
        let info = ChannelInfo {
            id: -100123,
            title: Some("Cats & <Dogs>".to_string()),
            description: None,
            member_count: 1500,
        };
        let text = format_stats(&info, &contents_with(2, 1), Some("en"));
        assert!(text.contains("Cats &amp; &lt;Dogs&gt;"));
        assert!(text.contains("-100123"));
        assert!(text.contains("1500"));
        assert!(text.contains("<b>Description:</b> none"));
        assert!(text.contains("Last addition"));
    }

    #[test]
    fn test_error_is_escaped() {
        let err = DashboardError::Delivery("Bad Request: <chat> not found".to_string());
        let text = format_error(&err, None);
        assert!(text.starts_with("❌"));
        assert!(text.contains("&lt;chat&gt;"));
    }
}
