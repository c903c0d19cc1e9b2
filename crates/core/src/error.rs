use thiserror::Error;

use crate::block::BlockKind;

/// Validation failures of post and category content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("category name cannot be empty")]
    EmptyName,

    /// A media block arrived without its file bytes.
    #[error("missing file data for {kind} block {index}")]
    MissingFileData { kind: BlockKind, index: usize },

    #[error("{kind} block {index} requires a filename")]
    EmptyFilename { kind: BlockKind, index: usize },

    #[error("heading block {index} requires heading_level")]
    MissingHeadingLevel { index: usize },

    #[error("heading block {index} requires text")]
    MissingHeadingText { index: usize },

    #[error("heading block {index} has level {level}, expected 1 to 6")]
    InvalidHeadingLevel { index: usize, level: u8 },

    /// A format or heading range falls outside its paragraph text.
    #[error(
        "paragraph {paragraph} has range {start}..{end} outside its {len} characters"
    )]
    InvalidRange {
        paragraph: i64,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("paragraph {paragraph} has a hyperlink format without a hyperlink")]
    MissingHyperlink { paragraph: i64 },

    #[error("paragraph {paragraph} has a hyperlink on a non-hyperlink format")]
    UnexpectedHyperlink { paragraph: i64 },
}
