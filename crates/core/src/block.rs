use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// A content unit of a post.
///
/// Serializes flat, with the payload under a key named after the block type:
///
/// ```json
/// { "id": 1, "order": 0, "type": "heading", "heading": { "level": 2, "text": "Intro" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Block {
    /// Position-derived (1-based) unless supplied by the caller.
    pub id: i64,
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub content: BlockContent,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    /// Media payload of an image or video block.
    pub fn media(&self) -> Option<&MediaBlock> {
        match &self.content {
            BlockContent::Image { image } => Some(image),
            BlockContent::Video { video } => Some(video),
            BlockContent::Text { .. } | BlockContent::Heading { .. } => None,
        }
    }

    pub fn media_mut(&mut self) -> Option<&mut MediaBlock> {
        match &mut self.content {
            BlockContent::Image { image } => Some(image),
            BlockContent::Video { video } => Some(video),
            BlockContent::Text { .. } | BlockContent::Heading { .. } => None,
        }
    }

    /// Check the payload invariants of the block at `index`.
    pub fn validate(&self, index: usize) -> Result<(), ContentError> {
        match &self.content {
            BlockContent::Text { text } => text.paragraphs.iter().try_for_each(Paragraph::validate),
            BlockContent::Image { image: media } | BlockContent::Video { video: media } => {
                if media.filename.is_empty() {
                    return Err(ContentError::EmptyFilename {
                        kind: self.kind(),
                        index,
                    });
                }
                Ok(())
            }
            BlockContent::Heading { heading } => {
                if !(1..=6).contains(&heading.level) {
                    return Err(ContentError::InvalidHeadingLevel {
                        index,
                        level: heading.level,
                    });
                }
                if heading.text.is_empty() {
                    return Err(ContentError::MissingHeadingText { index });
                }
                Ok(())
            }
        }
    }
}

/// The payload of a block; exactly one per block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum BlockContent {
    Text { text: TextBlock },
    Image { image: MediaBlock },
    Video { video: MediaBlock },
    Heading { heading: HeadingBlock },
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text { .. } => BlockKind::Text,
            Self::Image { .. } => BlockKind::Image,
            Self::Video { .. } => BlockKind::Video,
            Self::Heading { .. } => BlockKind::Heading,
        }
    }
}

/// Block type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum BlockKind {
    Text,
    Image,
    Video,
    Heading,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Heading => "heading",
        }
    }

    /// Whether blocks of this kind carry an uploaded file.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rich text: an ordered list of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TextBlock {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Paragraph {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub formats: Vec<Format>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<HeadingRange>,
    #[serde(default)]
    pub align: String,
}

impl Paragraph {
    /// Check every format and heading range against the paragraph text.
    ///
    /// Offsets count characters, not bytes. Ranges may overlap.
    pub fn validate(&self) -> Result<(), ContentError> {
        let len = self.text.chars().count();
        let check_range = |start: usize, end: usize| {
            if start <= end && end <= len {
                Ok(())
            } else {
                Err(ContentError::InvalidRange {
                    paragraph: self.id,
                    start,
                    end,
                    len,
                })
            }
        };

        for format in &self.formats {
            check_range(format.start, format.end)?;
            match (format.kind, &format.hyperlink) {
                (FormatKind::Hyperlink, None) => {
                    return Err(ContentError::MissingHyperlink { paragraph: self.id });
                }
                (FormatKind::Bold | FormatKind::Italic | FormatKind::Underline, Some(_)) => {
                    return Err(ContentError::UnexpectedHyperlink { paragraph: self.id });
                }
                _ => {}
            }
        }
        for heading in &self.headings {
            check_range(heading.start, heading.end)?;
        }
        Ok(())
    }
}

/// An inline format over the half-open character range `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Format {
    #[serde(rename = "type")]
    pub kind: FormatKind,
    pub start: usize,
    pub end: usize,
    /// Target URL; present exactly when `kind` is [`FormatKind::Hyperlink`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FormatKind {
    Bold,
    Italic,
    Underline,
    Hyperlink,
}

/// An inline heading range inside a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HeadingRange {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: usize,
    pub end: usize,
}

/// Image or video payload.
///
/// `filename` holds the storage key once uploaded. `link` is a presigned URL
/// filled in on read and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MediaBlock {
    #[serde(default)]
    pub id: i64,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HeadingBlock {
    pub level: u8,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str, formats: Vec<Format>) -> Paragraph {
        Paragraph {
            id: 1,
            text: text.to_owned(),
            formats,
            headings: vec![],
            align: "left".to_owned(),
        }
    }

    fn bold(start: usize, end: usize) -> Format {
        Format {
            kind: FormatKind::Bold,
            start,
            end,
            hyperlink: None,
        }
    }

    #[test]
    fn heading_block_serializes_flat() {
        let block = Block {
            id: 1,
            order: 0,
            content: BlockContent::Heading {
                heading: HeadingBlock {
                    level: 2,
                    text: "Intro".into(),
                },
            },
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "order": 0,
                "type": "heading",
                "heading": { "level": 2, "text": "Intro" }
            })
        );
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn image_block_omits_missing_link() {
        let block = Block {
            id: 3,
            order: 2,
            content: BlockContent::Image {
                image: MediaBlock {
                    id: 3,
                    filename: "images/1_cat_7.png".into(),
                    link: None,
                },
            },
        };
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"image\""));
        assert!(!json.contains("link"));
        assert_eq!(block.kind(), BlockKind::Image);
        assert!(block.media().is_some());
    }

    #[test]
    fn unknown_block_type_is_rejected() {
        let result: Result<Block, _> = serde_json::from_value(serde_json::json!({
            "id": 1, "order": 0, "type": "table", "table": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn payload_must_match_type() {
        let result: Result<Block, _> = serde_json::from_value(serde_json::json!({
            "id": 1, "order": 0, "type": "image", "video": { "filename": "a.mp4" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn format_range_may_end_at_text_length() {
        assert!(paragraph("hello", vec![bold(0, 5)]).validate().is_ok());
        assert!(paragraph("hello", vec![bold(2, 2)]).validate().is_ok());
    }

    #[test]
    fn format_range_counts_characters() {
        // Five characters, six bytes.
        assert!(paragraph("héllo", vec![bold(0, 5)]).validate().is_ok());
        assert!(paragraph("日本語", vec![bold(0, 4)]).validate().is_err());
    }

    #[test]
    fn format_range_past_end_fails() {
        let err = paragraph("hello", vec![bold(1, 6)]).validate().unwrap_err();
        assert_eq!(
            err,
            ContentError::InvalidRange {
                paragraph: 1,
                start: 1,
                end: 6,
                len: 5
            }
        );
    }

    #[test]
    fn reversed_range_fails() {
        assert!(paragraph("hello", vec![bold(3, 1)]).validate().is_err());
    }

    #[test]
    fn overlapping_formats_are_allowed() {
        let formats = vec![
            bold(0, 4),
            Format {
                kind: FormatKind::Italic,
                start: 2,
                end: 5,
                hyperlink: None,
            },
        ];
        assert!(paragraph("hello", formats).validate().is_ok());
    }

    #[test]
    fn hyperlink_presence_tracks_kind() {
        let missing = Format {
            kind: FormatKind::Hyperlink,
            start: 0,
            end: 1,
            hyperlink: None,
        };
        assert_eq!(
            paragraph("hello", vec![missing]).validate().unwrap_err(),
            ContentError::MissingHyperlink { paragraph: 1 }
        );

        let unexpected = Format {
            kind: FormatKind::Underline,
            start: 0,
            end: 1,
            hyperlink: Some("https://example.com".into()),
        };
        assert_eq!(
            paragraph("hello", vec![unexpected]).validate().unwrap_err(),
            ContentError::UnexpectedHyperlink { paragraph: 1 }
        );
    }

    #[test]
    fn heading_block_validation() {
        let block = |level: u8, text: &str| Block {
            id: 1,
            order: 0,
            content: BlockContent::Heading {
                heading: HeadingBlock {
                    level,
                    text: text.into(),
                },
            },
        };
        assert!(block(1, "Title").validate(0).is_ok());
        assert_eq!(
            block(7, "Title").validate(4).unwrap_err(),
            ContentError::InvalidHeadingLevel { index: 4, level: 7 }
        );
        assert_eq!(
            block(2, "").validate(1).unwrap_err(),
            ContentError::MissingHeadingText { index: 1 }
        );
    }

    #[test]
    fn media_block_requires_filename() {
        let block = Block {
            id: 1,
            order: 0,
            content: BlockContent::Video {
                video: MediaBlock::default(),
            },
        };
        assert_eq!(
            block.validate(2).unwrap_err(),
            ContentError::EmptyFilename {
                kind: BlockKind::Video,
                index: 2
            }
        );
    }
}
