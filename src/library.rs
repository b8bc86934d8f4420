//! # Media Library Module
//!
//! File-backed store of images and text posts that can be published to the
//! channel. Items live in two flat directories under the library root and
//! are identified by their timestamped filename:
//!
//! - `images/image_<YYYYMMDD_HHMMSS>.jpg`
//! - `posts/post_<YYYYMMDD_HHMMSS>.txt` (UTF-8)
//!
//! When two items land in the same second, a numeric suffix is appended
//! (`image_<ts>_1.jpg`). Existing files are never overwritten.

use chrono::{Local, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::errors::{ContentKind, DashboardError};

pub const IMAGES_DIR: &str = "images";
pub const POSTS_DIR: &str = "posts";
pub const IMAGE_PREFIX: &str = "image";
pub const POST_PREFIX: &str = "post";
pub const IMAGE_EXTENSION: &str = "jpg";
pub const POST_EXTENSION: &str = "txt";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// How random content is assembled when both images and posts exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomContentPolicy {
    /// Always pair a random image with random post text
    #[default]
    Pair,
    /// Pick image+text, image-only or text-only with equal probability
    Mixed,
}

impl RandomContentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RandomContentPolicy::Pair => "pair",
            RandomContentPolicy::Mixed => "mixed",
        }
    }
}

impl FromStr for RandomContentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pair" => Ok(RandomContentPolicy::Pair),
            "mixed" => Ok(RandomContentPolicy::Mixed),
            other => Err(format!("unknown policy '{other}', expected 'pair' or 'mixed'")),
        }
    }
}

/// A randomly assembled piece of content ready to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandomContent {
    ImageText { image: PathBuf, caption: String },
    ImageOnly(PathBuf),
    TextOnly(String),
}

impl RandomContent {
    pub fn variant_name(&self) -> &'static str {
        match self {
            RandomContent::ImageText { .. } => "image_text",
            RandomContent::ImageOnly(_) => "image_only",
            RandomContent::TextOnly(_) => "text_only",
        }
    }
}

/// Snapshot of the library directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryContents {
    pub image_filenames: Vec<String>,
    pub post_filenames: Vec<String>,
    pub images_count: usize,
    pub posts_count: usize,
}

impl LibraryContents {
    pub fn is_empty(&self) -> bool {
        self.images_count == 0 && self.posts_count == 0
    }

    /// Newest creation time encoded in any stored filename
    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.image_filenames
            .iter()
            .chain(self.post_filenames.iter())
            .filter_map(|name| parse_timestamp(name))
            .max()
    }
}

/// Extract the creation time from a library filename such as
/// `image_20240131_235959.jpg` or `post_20240131_235959_2.txt`
pub fn parse_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let (_, rest) = filename.split_once('_')?;
    let stamp = rest.get(..15)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Media library rooted at a directory holding `images/` and `posts/`
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    images_dir: PathBuf,
    posts_dir: PathBuf,
    policy: RandomContentPolicy,
}

impl MediaLibrary {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            images_dir: root.join(IMAGES_DIR),
            posts_dir: root.join(POSTS_DIR),
            policy: RandomContentPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RandomContentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    pub fn policy(&self) -> RandomContentPolicy {
        self.policy
    }

    /// Create both library directories if they are missing
    pub fn ensure_layout(&self) -> Result<(), DashboardError> {
        fs::create_dir_all(&self.images_dir)?;
        fs::create_dir_all(&self.posts_dir)?;
        Ok(())
    }

    /// List stored filenames in directory iteration order
    pub fn list_contents(&self) -> LibraryContents {
        let image_filenames = list_files(&self.images_dir);
        let post_filenames = list_files(&self.posts_dir);

        LibraryContents {
            images_count: image_filenames.len(),
            posts_count: post_filenames.len(),
            image_filenames,
            post_filenames,
        }
    }

    /// Path of a uniformly chosen image, `None` when there are no images
    pub fn get_random_image(&self) -> Option<PathBuf> {
        let names = list_files(&self.images_dir);
        names
            .choose(&mut rand::thread_rng())
            .map(|name| self.images_dir.join(name))
    }

    /// Text of a uniformly chosen post, `None` when there are no posts
    pub fn get_random_post(&self) -> Result<Option<String>, DashboardError> {
        let names = list_files(&self.posts_dir);
        let Some(name) = names.choose(&mut rand::thread_rng()) else {
            return Ok(None);
        };

        let path = self.posts_dir.join(name);
        let text = fs::read_to_string(&path).map_err(|e| {
            DashboardError::Storage(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok(Some(text))
    }

    /// Assemble random content according to the configured policy.
    ///
    /// The variant is chosen before any post is read, so an image-only pick
    /// never touches the posts directory. An entirely empty library yields
    /// `EmptyLibrary`; callers are expected to check `list_contents` first.
    pub fn get_random_content(&self) -> Result<RandomContent, DashboardError> {
        let image = self.get_random_image();
        let has_posts = !list_files(&self.posts_dir).is_empty();

        let shape = match (image.is_some(), has_posts) {
            (true, true) => match self.policy {
                RandomContentPolicy::Pair => ContentShape::ImageText,
                RandomContentPolicy::Mixed => match rand::thread_rng().gen_range(0..3) {
                    0 => ContentShape::ImageText,
                    1 => ContentShape::ImageOnly,
                    _ => ContentShape::TextOnly,
                },
            },
            (true, false) => ContentShape::ImageOnly,
            (false, true) => ContentShape::TextOnly,
            (false, false) => return Err(DashboardError::EmptyLibrary(ContentKind::Any)),
        };

        let content = match (shape, image) {
            (ContentShape::ImageOnly, Some(image)) => RandomContent::ImageOnly(image),
            (ContentShape::ImageText, Some(image)) => match self.get_random_post()? {
                Some(caption) => RandomContent::ImageText { image, caption },
                None => RandomContent::ImageOnly(image),
            },
            (_, image) => match (self.get_random_post()?, image) {
                (Some(text), _) => RandomContent::TextOnly(text),
                (None, Some(image)) => RandomContent::ImageOnly(image),
                (None, None) => return Err(DashboardError::EmptyLibrary(ContentKind::Any)),
            },
        };

        debug!(variant = content.variant_name(), policy = self.policy.as_str(), "Assembled random content");
        Ok(content)
    }

    /// Store image bytes under a fresh timestamped name
    pub fn add_image(&self, data: &[u8]) -> Result<String, DashboardError> {
        self.add_image_at(data, Local::now().naive_local())
    }

    /// Store post text under a fresh timestamped name
    pub fn add_post(&self, text: &str) -> Result<String, DashboardError> {
        self.add_post_at(text, Local::now().naive_local())
    }

    pub fn add_image_at(&self, data: &[u8], at: NaiveDateTime) -> Result<String, DashboardError> {
        fs::create_dir_all(&self.images_dir)?;
        let filename = write_unique(&self.images_dir, IMAGE_PREFIX, IMAGE_EXTENSION, at, data)?;
        info!(filename = %filename, bytes = data.len(), "Stored new image");
        Ok(filename)
    }

    pub fn add_post_at(&self, text: &str, at: NaiveDateTime) -> Result<String, DashboardError> {
        fs::create_dir_all(&self.posts_dir)?;
        let filename =
            write_unique(&self.posts_dir, POST_PREFIX, POST_EXTENSION, at, text.as_bytes())?;
        info!(filename = %filename, chars = text.chars().count(), "Stored new post");
        Ok(filename)
    }
}

#[derive(Debug, Clone, Copy)]
enum ContentShape {
    ImageText,
    ImageOnly,
    TextOnly,
}

/// Regular, non-hidden files of a directory; a missing or unreadable
/// directory lists as empty
fn list_files(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                warn!(dir = %dir.display(), error = %e, "Failed to read library directory");
            }
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .collect()
}

fn write_unique(
    dir: &Path,
    prefix: &str,
    extension: &str,
    at: NaiveDateTime,
    data: &[u8],
) -> Result<String, DashboardError> {
    let stamp = at.format(TIMESTAMP_FORMAT).to_string();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = if attempt == 0 {
            format!("{prefix}_{stamp}.{extension}")
        } else {
            format!("{prefix}_{stamp}_{attempt}.{extension}")
        };
        let path = dir.join(&filename);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(data).and_then(|_| file.sync_all()) {
            drop(file);
            if let Err(cleanup_err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %cleanup_err, "Failed to remove partial file");
            }
            return Err(e.into());
        }

        return Ok(filename);
    }

    Err(DashboardError::Storage(format!(
        "no free filename for {prefix}_{stamp} after {MAX_NAME_ATTEMPTS} attempts"
    )))
}
