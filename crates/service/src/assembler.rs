//! Request to entity assembly for blog posts.
//!
//! Assembly runs in two phases. The first builds every block from the request
//! and validates the whole post without touching storage; the second uploads
//! media bytes and swaps each media filename for the storage key the uploader
//! returned. A post that fails validation therefore never uploads anything,
//! and a post is only handed to a repository once every upload finished.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::Utc;
use inkwell_blob::{MediaKind, Uploader};
use inkwell_core::{
    Block, BlockContent, BlockKind, BlogPost, ContentError, CreateBlockRequest,
    CreateBlogPostRequest, CreateParagraphRequest, Format, HeadingBlock, MediaBlock, Paragraph,
    PostStatus, TextBlock,
};
use tracing::{debug, error};

use crate::error::ServiceError;

/// File bytes of media blocks, keyed by block index in the request.
pub type FileParts = HashMap<usize, Bytes>;

/// A media upload scheduled for the second phase.
struct PendingUpload {
    index: usize,
    kind: MediaKind,
    data: Bytes,
}

/// Build a validated, active [`BlogPost`] owned by `owner_id`.
///
/// Media blocks need bytes in `files` under their block index. Their bytes
/// are uploaded into the block type's folder and the returned storage key
/// replaces the filename.
pub async fn assemble_blog_post(
    request: CreateBlogPostRequest,
    files: &FileParts,
    uploader: &dyn Uploader,
    owner_id: &str,
) -> Result<BlogPost, ServiceError> {
    if request.title.trim().is_empty() {
        return Err(ContentError::EmptyTitle.into());
    }

    let mut blocks = Vec::with_capacity(request.blocks.len());
    let mut pending = Vec::new();
    for (index, block) in request.blocks.into_iter().enumerate() {
        if let Some(kind) = media_kind(block.kind) {
            let data = files
                .get(&index)
                .cloned()
                .ok_or(ContentError::MissingFileData {
                    kind: block.kind,
                    index,
                })?;
            pending.push(PendingUpload { index, kind, data });
        }
        blocks.push(build_block(index, block)?);
    }

    let now = Utc::now();
    let mut post = BlogPost {
        id: None,
        author_id: owner_id.to_owned(),
        categories: request.categories,
        title: request.title,
        blocks,
        status: PostStatus::Active,
        created_at: now,
        updated_at: now,
    };
    post.validate()?;

    for upload in pending {
        let Some(media) = post.blocks[upload.index].media_mut() else {
            continue;
        };
        let key = uploader
            .upload(
                upload.kind.folder(),
                &media.filename,
                upload.kind.content_type(&media.filename),
                owner_id,
                upload.data,
            )
            .await
            .map_err(|e| {
                error!(index = upload.index, error = %e, "media upload failed");
                ServiceError::from(e)
            })?;
        debug!(index = upload.index, %key, "media block uploaded");
        media.filename = key;
    }

    Ok(post)
}

fn media_kind(kind: BlockKind) -> Option<MediaKind> {
    match kind {
        BlockKind::Image => Some(MediaKind::Image),
        BlockKind::Video => Some(MediaKind::Video),
        BlockKind::Text | BlockKind::Heading => None,
    }
}

/// 1-based position of the item at `index`.
fn position(index: usize) -> i64 {
    i64::try_from(index).map_or(i64::MAX, |i| i.saturating_add(1))
}

fn build_block(index: usize, request: CreateBlockRequest) -> Result<Block, ContentError> {
    let id = if request.id == 0 {
        position(index)
    } else {
        request.id
    };

    let content = match request.kind {
        BlockKind::Text => BlockContent::Text {
            text: TextBlock {
                paragraphs: request
                    .paragraphs
                    .into_iter()
                    .enumerate()
                    .map(|(j, p)| build_paragraph(j, p))
                    .collect(),
            },
        },
        BlockKind::Image => BlockContent::Image {
            image: MediaBlock {
                id,
                filename: request.filename,
                link: None,
            },
        },
        BlockKind::Video => BlockContent::Video {
            video: MediaBlock {
                id,
                filename: request.filename,
                link: None,
            },
        },
        BlockKind::Heading => {
            let level = request
                .heading_level
                .ok_or(ContentError::MissingHeadingLevel { index })?;
            let text = request
                .text
                .filter(|t| !t.is_empty())
                .ok_or(ContentError::MissingHeadingText { index })?;
            BlockContent::Heading {
                heading: HeadingBlock { level, text },
            }
        }
    };

    Ok(Block {
        id,
        order: request.order,
        content,
    })
}

fn build_paragraph(index: usize, request: CreateParagraphRequest) -> Paragraph {
    Paragraph {
        id: position(index),
        text: request.text,
        formats: request
            .formats
            .into_iter()
            .map(|f| Format {
                kind: f.kind,
                start: f.start,
                end: f.end,
                hyperlink: f.hyperlink,
            })
            .collect(),
        headings: request.headings,
        align: request.align,
    }
}

#[cfg(test)]
mod tests {
    use inkwell_blob::MemoryUploader;
    use inkwell_core::{CreateFormatRequest, FormatKind};

    use super::*;

    fn request(blocks: Vec<CreateBlockRequest>) -> CreateBlogPostRequest {
        CreateBlogPostRequest {
            title: "Hello".into(),
            blocks,
            categories: vec!["rust".into()],
        }
    }

    fn heading(level: Option<u8>, text: Option<&str>) -> CreateBlockRequest {
        let mut block = CreateBlockRequest::new(BlockKind::Heading);
        block.heading_level = level;
        block.text = text.map(str::to_owned);
        block
    }

    fn image(filename: &str) -> CreateBlockRequest {
        let mut block = CreateBlockRequest::new(BlockKind::Image);
        block.filename = filename.into();
        block
    }

    #[tokio::test]
    async fn single_image_is_uploaded_once() {
        let uploader = MemoryUploader::new();
        let files = FileParts::from([(0, Bytes::from_static(b"\x89PNG"))]);

        let post = assemble_blog_post(request(vec![image("cat.png")]), &files, &uploader, "42")
            .await
            .unwrap();

        let uploads = uploader.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].folder, "images");
        assert_eq!(uploads[0].content_type, "image/png");
        assert_eq!(uploads[0].owner_id, "42");
        assert_eq!(uploads[0].filename, "cat.png");

        let media = post.blocks[0].media().unwrap();
        assert_eq!(media.filename, uploads[0].key);
        assert!(media.link.is_none());
        assert_eq!(post.author_id, "42");
        assert_eq!(post.status, PostStatus::Active);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[tokio::test]
    async fn video_uses_video_folder_and_type() {
        let uploader = MemoryUploader::new();
        let mut block = CreateBlockRequest::new(BlockKind::Video);
        block.filename = "talk.webm".into();
        let files = FileParts::from([(0, Bytes::from_static(b"webm"))]);

        assemble_blog_post(request(vec![block]), &files, &uploader, "1")
            .await
            .unwrap();

        let uploads = uploader.uploads();
        assert_eq!(uploads[0].folder, "videos");
        assert_eq!(uploads[0].content_type, "video/webm");
    }

    #[tokio::test]
    async fn heading_without_text_uploads_nothing() {
        let uploader = MemoryUploader::new();
        let files = FileParts::from([(0, Bytes::from_static(b"png"))]);

        let err = assemble_blog_post(
            request(vec![image("cat.png"), heading(Some(2), None)]),
            &files,
            &uploader,
            "1",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("requires text")));
        assert!(uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn heading_without_level_is_rejected() {
        let uploader = MemoryUploader::new();
        let err = assemble_blog_post(
            request(vec![heading(None, Some("Intro"))]),
            &FileParts::new(),
            &uploader,
            "1",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("heading_level")));
    }

    #[tokio::test]
    async fn media_block_without_bytes_is_rejected() {
        let uploader = MemoryUploader::new();
        let err = assemble_blog_post(
            request(vec![heading(Some(1), Some("Intro")), image("cat.png")]),
            &FileParts::new(),
            &uploader,
            "1",
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, ServiceError::Validation(ref m) if m == "missing file data for image block 1")
        );
        assert!(uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let uploader = MemoryUploader::new();
        let mut req = request(vec![]);
        req.title = "  ".into();
        let err = assemble_blog_post(req, &FileParts::new(), &uploader, "1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "title cannot be empty"));
    }

    #[tokio::test]
    async fn ids_come_from_request_or_position() {
        let uploader = MemoryUploader::new();
        let mut explicit = heading(Some(1), Some("One"));
        explicit.id = 7;

        let mut text = CreateBlockRequest::new(BlockKind::Text);
        text.paragraphs = vec![
            CreateParagraphRequest {
                id: 99,
                text: "first".into(),
                ..CreateParagraphRequest::default()
            },
            CreateParagraphRequest {
                id: 99,
                text: "bold".into(),
                formats: vec![CreateFormatRequest {
                    kind: FormatKind::Bold,
                    start: 0,
                    end: 4,
                    hyperlink: None,
                }],
                ..CreateParagraphRequest::default()
            },
        ];

        let post = assemble_blog_post(
            request(vec![explicit, text]),
            &FileParts::new(),
            &uploader,
            "1",
        )
        .await
        .unwrap();

        assert_eq!(post.blocks[0].id, 7);
        assert_eq!(post.blocks[1].id, 2);
        let BlockContent::Text { text } = &post.blocks[1].content else {
            panic!("expected a text block");
        };
        let ids: Vec<i64> = text.paragraphs.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(text.paragraphs[1].formats[0].kind, FormatKind::Bold);
    }

    #[tokio::test]
    async fn format_outside_text_is_rejected() {
        let uploader = MemoryUploader::new();
        let mut text = CreateBlockRequest::new(BlockKind::Text);
        text.paragraphs = vec![CreateParagraphRequest {
            text: "hi".into(),
            formats: vec![CreateFormatRequest {
                kind: FormatKind::Italic,
                start: 0,
                end: 3,
                hyperlink: None,
            }],
            ..CreateParagraphRequest::default()
        }];

        let err = assemble_blog_post(request(vec![text]), &FileParts::new(), &uploader, "1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
