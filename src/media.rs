// Copyright (c) Photogram Team
// SPDX-License-Identifier: Apache-2.0

//! Image storage: extension gating, downscaling and stable reference
//! strings. References have the form `media/{posts|avatars}/<filename>`
//! and are resolved back to files relative to the configured media root.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::AppError;

/// Post images are scaled down to fit this bounding box.
pub const POST_MAX_BOUNDS: (u32, u32) = (732, 732);
/// Avatars are resized to exactly this size.
pub const AVATAR_SIZE: (u32, u32) = (400, 400);

const POSTS_DIR: &str = "posts";
const AVATARS_DIR: &str = "avatars";

/// Check an upload's extension and return it normalized to lowercase.
pub fn validate_extension(filename: &str) -> Result<&'static str, AppError> {
    let (_, ext) = filename
        .rsplit_once('.')
        .ok_or(AppError::UnsupportedMediaType)?;

    match ext.to_ascii_lowercase().as_str() {
        "png" => Ok(".png"),
        "jpg" => Ok(".jpg"),
        "jpeg" => Ok(".jpeg"),
        _ => Err(AppError::UnsupportedMediaType),
    }
}

/// Content type for a stored reference, by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Store a post image, downscaled to fit [`POST_MAX_BOUNDS`]. Returns the
/// reference string persisted on the post.
pub fn store_post_image(
    root: &Path,
    author_id: i32,
    upload_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let ext = validate_extension(upload_name)?;
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let filename = format!("{}_{}{}", author_id, stamp, ext);

    let image = image::load_from_memory(bytes)?;
    let (max_w, max_h) = POST_MAX_BOUNDS;
    let image = if image.width() > max_w || image.height() > max_h {
        image.thumbnail(max_w, max_h)
    } else {
        image
    };

    let dir = root.join(POSTS_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(&filename);
    image.save(&path)?;
    debug!("stored post image at {}", path.display());

    Ok(format!("media/{}/{}", POSTS_DIR, filename))
}

/// Store a user's avatar, resized to [`AVATAR_SIZE`]. The filename is
/// stable per user, so a new upload replaces the previous one.
pub fn store_avatar(
    root: &Path,
    user_id: i32,
    username: &str,
    upload_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let ext = validate_extension(upload_name)?;
    let filename = format!("{}_{}{}", user_id, username, ext);

    let (w, h) = AVATAR_SIZE;
    let image = image::load_from_memory(bytes)?.resize_exact(w, h, FilterType::Lanczos3);

    let dir = root.join(AVATARS_DIR);
    fs::create_dir_all(&dir)?;
    let path = dir.join(&filename);
    image.save(&path)?;
    debug!("stored avatar at {}", path.display());

    Ok(format!("media/{}/{}", AVATARS_DIR, filename))
}

/// Path of a stored post image.
pub fn post_image_path(root: &Path, filename: &str) -> PathBuf {
    root.join(POSTS_DIR).join(filename)
}

/// Path of a stored avatar.
pub fn avatar_path(root: &Path, filename: &str) -> PathBuf {
    root.join(AVATARS_DIR).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encoding a fresh image cannot fail");
        buf.into_inner()
    }

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("photogram-media-{}", name));
        let _ = fs::remove_dir_all(&root);
        root
    }

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        assert_eq!(validate_extension("shot.png").unwrap(), ".png");
        assert_eq!(validate_extension("shot.JPG").unwrap(), ".jpg");
        assert_eq!(validate_extension("my.holiday.jpeg").unwrap(), ".jpeg");
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["shot.gif", "shot.webp", "shot", "script.sh"] {
            assert!(matches!(
                validate_extension(name),
                Err(AppError::UnsupportedMediaType)
            ));
        }
    }

    #[test]
    fn content_types_match_extensions() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
    }

    #[test]
    fn stores_post_image_and_returns_reference() {
        let root = temp_root("post-store");
        let reference = store_post_image(&root, 7, "shot.png", &png_bytes(8, 8)).unwrap();

        assert!(reference.starts_with("media/posts/7_"));
        assert!(reference.ends_with(".png"));

        let filename = reference.rsplit('/').next().unwrap();
        assert!(post_image_path(&root, filename).is_file());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn large_post_images_are_downscaled_to_fit() {
        let root = temp_root("post-scale");
        let reference = store_post_image(&root, 1, "wide.png", &png_bytes(1600, 800)).unwrap();

        let filename = reference.rsplit('/').next().unwrap();
        let stored = image::open(post_image_path(&root, filename)).unwrap();
        assert_eq!((stored.width(), stored.height()), (732, 366));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn small_post_images_are_left_alone() {
        let root = temp_root("post-small");
        let reference = store_post_image(&root, 1, "tiny.png", &png_bytes(64, 32)).unwrap();

        let filename = reference.rsplit('/').next().unwrap();
        let stored = image::open(post_image_path(&root, filename)).unwrap();
        assert_eq!((stored.width(), stored.height()), (64, 32));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn avatars_are_resized_exactly_and_named_stably() {
        let root = temp_root("avatar");
        let reference = store_avatar(&root, 3, "ada", "face.png", &png_bytes(800, 600)).unwrap();
        assert_eq!(reference, "media/avatars/3_ada.png");

        let stored = image::open(avatar_path(&root, "3_ada.png")).unwrap();
        assert_eq!((stored.width(), stored.height()), AVATAR_SIZE);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn rejects_bad_upload_before_touching_disk() {
        let root = temp_root("reject");
        assert!(matches!(
            store_post_image(&root, 1, "clip.mp4", &png_bytes(8, 8)),
            Err(AppError::UnsupportedMediaType)
        ));
        assert!(!root.exists());
    }
}
