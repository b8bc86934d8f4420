//! # Media Library Tests
//!
//! Filesystem-backed tests for listing, random selection and storage of
//! library items. Every test works in its own temporary directory.

use channel_dashboard::errors::{ContentKind, DashboardError};
use channel_dashboard::library::{
    parse_timestamp, MediaLibrary, RandomContent, RandomContentPolicy, IMAGES_DIR, POSTS_DIR,
};
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_library() -> (TempDir, MediaLibrary) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let library = MediaLibrary::new(dir.path());
        library.ensure_layout().expect("Failed to create library layout");
        (dir, library)
    }

    fn write_image(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(IMAGES_DIR).join(name), b"\xFF\xD8\xFFfake-jpeg").unwrap();
    }

    fn write_post(dir: &TempDir, name: &str, text: &str) {
        fs::write(dir.path().join(POSTS_DIR).join(name), text).unwrap();
    }

    #[test]
    fn test_empty_library() {
        let (_dir, library) = setup_library();

        let contents = library.list_contents();
        assert!(contents.is_empty());
        assert!(contents.image_filenames.is_empty());
        assert!(contents.post_filenames.is_empty());

        assert_eq!(library.get_random_image(), None);
        assert_eq!(library.get_random_post().unwrap(), None);
        assert_eq!(
            library.get_random_content(),
            Err(DashboardError::EmptyLibrary(ContentKind::Any))
        );
    }

    #[test]
    fn test_missing_directories_list_as_empty() {
        let dir = TempDir::new().unwrap();
        let library = MediaLibrary::new(dir.path().join("does-not-exist"));

        let contents = library.list_contents();
        assert_eq!(contents.images_count, 0);
        assert_eq!(contents.posts_count, 0);
        assert_eq!(library.get_random_image(), None);
    }

    #[test]
    fn test_counts_match_filenames() {
        let (dir, library) = setup_library();
        write_image(&dir, "image_20240101_120000.jpg");
        write_image(&dir, "image_20240101_120001.jpg");
        write_post(&dir, "post_20240101_120000.txt", "first");
        // Hidden files and nested directories are not library items
        write_image(&dir, ".DS_Store");
        fs::create_dir(dir.path().join(IMAGES_DIR).join("nested")).unwrap();

        let contents = library.list_contents();
        assert_eq!(contents.images_count, contents.image_filenames.len());
        assert_eq!(contents.posts_count, contents.post_filenames.len());
        assert_eq!(contents.images_count, 2);
        assert_eq!(contents.posts_count, 1);
    }

    #[test]
    fn test_random_image_is_in_directory() {
        let (dir, library) = setup_library();
        for second in 0..5 {
            write_image(&dir, &format!("image_20240101_1200{second:02}.jpg"));
        }

        for _ in 0..20 {
            let path = library.get_random_image().expect("Library has images");
            assert!(path.exists());
            assert_eq!(path.parent(), Some(library.images_dir()));
        }
    }

    #[test]
    fn test_random_post_returns_text() {
        let (dir, library) = setup_library();
        write_post(&dir, "post_20240101_120000.txt", "مرحبا بالعالم");

        assert_eq!(
            library.get_random_post().unwrap(),
            Some("مرحبا بالعالم".to_string())
        );
    }

    #[test]
    fn test_unreadable_post_is_storage_error() {
        let (dir, library) = setup_library();
        fs::write(dir.path().join(POSTS_DIR).join("post_20240101_120000.txt"), [0xFF, 0xFE, 0x00]).unwrap();

        assert!(matches!(library.get_random_post(), Err(DashboardError::Storage(_))));
    }

    #[test]
    fn test_add_post_then_list() {
        let (dir, library) = setup_library();
        let before = library.list_contents().posts_count;

        let filename = library.add_post("Hello").unwrap();

        let contents = library.list_contents();
        assert_eq!(contents.posts_count, before + 1);
        assert!(contents.post_filenames.contains(&filename));
        assert!(filename.starts_with("post_"));
        assert!(filename.ends_with(".txt"));
        assert!(parse_timestamp(&filename).is_some());

        let stored = fs::read_to_string(dir.path().join(POSTS_DIR).join(&filename)).unwrap();
        assert_eq!(stored, "Hello");
    }

    #[test]
    fn test_add_image_then_list() {
        let (dir, library) = setup_library();
        let data = b"\x89PNG\r\n\x1a\nrest-of-image";

        let filename = library.add_image(data).unwrap();

        let contents = library.list_contents();
        assert_eq!(contents.images_count, 1);
        assert_eq!(contents.image_filenames, vec![filename.clone()]);
        assert!(filename.starts_with("image_"));
        assert!(filename.ends_with(".jpg"));

        let stored = fs::read(dir.path().join(IMAGES_DIR).join(&filename)).unwrap();
        assert_eq!(stored, data);
    }

    #[test]
    fn test_add_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let library = MediaLibrary::new(dir.path().join("fresh"));

        let filename = library.add_post("created on demand").unwrap();
        assert!(library.posts_dir().join(filename).exists());
    }

    #[test]
    fn test_same_second_adds_do_not_overwrite() {
        let (dir, library) = setup_library();
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        let first = library.add_post_at("first", at).unwrap();
        let second = library.add_post_at("second", at).unwrap();
        let third = library.add_post_at("third", at).unwrap();

        assert_eq!(first, "post_20240501_093000.txt");
        assert_eq!(second, "post_20240501_093000_1.txt");
        assert_eq!(third, "post_20240501_093000_2.txt");

        let posts = dir.path().join(POSTS_DIR);
        assert_eq!(fs::read_to_string(posts.join(&first)).unwrap(), "first");
        assert_eq!(fs::read_to_string(posts.join(&second)).unwrap(), "second");
        assert_eq!(library.list_contents().posts_count, 3);
    }

    #[test]
    fn test_random_content_image_only() {
        let (dir, library) = setup_library();
        write_image(&dir, "image_20240101_120000.jpg");

        match library.get_random_content().unwrap() {
            RandomContent::ImageOnly(path) => assert!(path.exists()),
            other => panic!("Unexpected variant: {}", other.variant_name()),
        }
    }

    #[test]
    fn test_random_content_text_only() {
        let (dir, library) = setup_library();
        write_post(&dir, "post_20240101_120000.txt", "just text");

        assert_eq!(
            library.get_random_content().unwrap(),
            RandomContent::TextOnly("just text".to_string())
        );
    }

    #[test]
    fn test_random_content_pairs_by_default() {
        let (dir, library) = setup_library();
        write_image(&dir, "image_20240101_120000.jpg");
        write_post(&dir, "post_20240101_120000.txt", "caption");
        assert_eq!(library.policy(), RandomContentPolicy::Pair);

        for _ in 0..20 {
            match library.get_random_content().unwrap() {
                RandomContent::ImageText { image, caption } => {
                    assert!(image.exists());
                    assert_eq!(caption, "caption");
                }
                other => panic!("Unexpected variant: {}", other.variant_name()),
            }
        }
    }

    #[test]
    fn test_mixed_policy_yields_valid_variants() {
        let (dir, library) = setup_library();
        let library = library.with_policy(RandomContentPolicy::Mixed);
        write_image(&dir, "image_20240101_120000.jpg");
        write_post(&dir, "post_20240101_120000.txt", "caption");

        for _ in 0..50 {
            match library.get_random_content().unwrap() {
                RandomContent::ImageText { image, caption } => {
                    assert!(image.exists());
                    assert_eq!(caption, "caption");
                }
                RandomContent::ImageOnly(image) => assert!(image.exists()),
                RandomContent::TextOnly(text) => assert_eq!(text, "caption"),
            }
        }
    }

    #[test]
    fn test_mixed_image_only_skips_unreadable_post() {
        let (dir, library) = setup_library();
        let library = library.with_policy(RandomContentPolicy::Mixed);
        write_image(&dir, "image_20240101_120000.jpg");
        fs::write(dir.path().join(POSTS_DIR).join("post_20240101_120000.txt"), [0xFF, 0xFE, 0x00]).unwrap();

        let mut image_only = 0;
        for _ in 0..64 {
            match library.get_random_content() {
                Ok(RandomContent::ImageOnly(image)) => {
                    assert!(image.exists());
                    image_only += 1;
                }
                Ok(other) => panic!("Unexpected variant: {}", other.variant_name()),
                Err(e) => assert!(matches!(e, DashboardError::Storage(_))),
            }
        }
        assert!(image_only > 0);
    }

    #[test]
    fn test_pair_policy_reports_unreadable_post() {
        let (dir, library) = setup_library();
        write_image(&dir, "image_20240101_120000.jpg");
        fs::write(dir.path().join(POSTS_DIR).join("post_20240101_120000.txt"), [0xFF, 0xFE, 0x00]).unwrap();

        assert!(matches!(library.get_random_content(), Err(DashboardError::Storage(_))));
    }
}
