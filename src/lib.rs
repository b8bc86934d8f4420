//! # Channel Dashboard Bot
//!
//! A Telegram bot that gives channel admins an inline menu to inspect the
//! channel, publish random images and posts from a local media library, and
//! add new items to that library through short guided dialogs.

pub mod admin;
pub mod bot;
pub mod config;
pub mod dashboard;
pub mod dialogue;
pub mod errors;
pub mod library;
pub mod localization;
pub mod publisher;
