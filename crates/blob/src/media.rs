//! Media folders, content types and storage key naming.

use crate::error::BlobError;

/// The kind of media being stored. Selects the folder and content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Avatar,
}

impl MediaKind {
    /// Storage folder for this kind.
    pub fn folder(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
            Self::Avatar => "avatars",
        }
    }

    /// Content type for `filename`, chosen by extension.
    pub fn content_type(self, filename: &str) -> &'static str {
        let ext = split_extension(filename).1.trim_start_matches('.').to_ascii_lowercase();
        match self {
            Self::Image | Self::Avatar => match ext.as_str() {
                "jpg" | "jpeg" => "image/jpeg",
                "gif" => "image/gif",
                "webp" => "image/webp",
                _ => "image/png",
            },
            Self::Video => match ext.as_str() {
                "webm" => "video/webm",
                "mov" => "video/quicktime",
                _ => "video/mp4",
            },
        }
    }
}

/// Split `name` into base and extension (with its leading dot).
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

fn sanitize(base: &str) -> String {
    base.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Build the storage key `{folder}/{unix_ts}_{base}_{owner}{ext}`.
///
/// Spaces and path separators in the base name and extension become
/// underscores. An empty
/// folder yields a key without the folder prefix.
pub fn object_key(
    folder: &str,
    filename: &str,
    owner_id: &str,
    unix_ts: i64,
) -> Result<String, BlobError> {
    if filename.is_empty() {
        return Err(BlobError::EmptyFilename);
    }

    let (base, ext) = split_extension(filename);
    let name = format!(
        "{unix_ts}_{}_{owner_id}{}",
        sanitize(base),
        sanitize(ext)
    );
    if folder.is_empty() {
        Ok(name)
    } else {
        Ok(format!("{folder}/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders() {
        assert_eq!(MediaKind::Image.folder(), "images");
        assert_eq!(MediaKind::Video.folder(), "videos");
        assert_eq!(MediaKind::Avatar.folder(), "avatars");
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(MediaKind::Image.content_type("a.JPG"), "image/jpeg");
        assert_eq!(MediaKind::Image.content_type("a.webp"), "image/webp");
        assert_eq!(MediaKind::Image.content_type("noext"), "image/png");
        assert_eq!(MediaKind::Video.content_type("clip.mov"), "video/quicktime");
        assert_eq!(MediaKind::Video.content_type("clip.avi"), "video/mp4");
        assert_eq!(MediaKind::Avatar.content_type("me.gif"), "image/gif");
    }

    #[test]
    fn key_layout() {
        let key = object_key("images", "my cat.png", "42", 1_700_000_000).unwrap();
        assert_eq!(key, "images/1700000000_my_cat_42.png");
    }

    #[test]
    fn key_without_folder_or_extension() {
        let key = object_key("", "notes", "7", 5).unwrap();
        assert_eq!(key, "5_notes_7");
    }

    #[test]
    fn separators_cannot_escape_the_folder() {
        let key = object_key("images", "../etc/passwd.png", "1", 1).unwrap();
        assert_eq!(key, "images/1_.._etc_passwd_1.png");
    }

    #[test]
    fn separators_in_the_extension_are_replaced() {
        let key = object_key("images", "a.b/c", "7", 3).unwrap();
        assert_eq!(key, "images/3_a_7.b_c");
        assert_eq!(key.matches('/').count(), 1);
    }

    #[test]
    fn empty_filename_is_rejected() {
        assert!(matches!(
            object_key("images", "", "1", 1),
            Err(BlobError::EmptyFilename)
        ));
    }
}
