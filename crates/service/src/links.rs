use std::time::Duration;

use inkwell_blob::Uploader;
use inkwell_core::BlogPost;
use tracing::warn;

/// Lifetime of presigned media links handed out on read.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(15 * 60);

/// Fill in a presigned `link` on every image and video block with a stored
/// filename.
///
/// Presign failures are logged and leave the link empty; they never fail the
/// read.
pub async fn attach_links(posts: &mut [BlogPost], uploader: &dyn Uploader, ttl: Duration) {
    for post in posts.iter_mut() {
        for block in &mut post.blocks {
            let Some(media) = block.media_mut() else {
                continue;
            };
            if media.filename.is_empty() {
                continue;
            }
            match uploader.presign(&media.filename, ttl).await {
                Ok(url) => media.link = Some(url),
                Err(e) => {
                    warn!(
                        post_id = ?post.id,
                        key = %media.filename,
                        error = %e,
                        "presign failed, omitting link"
                    );
                    media.link = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use inkwell_blob::MemoryUploader;
    use inkwell_core::{Block, BlockContent, HeadingBlock, MediaBlock};

    use super::*;

    fn media_post(filenames: &[&str]) -> BlogPost {
        let mut blocks: Vec<Block> = filenames
            .iter()
            .enumerate()
            .map(|(i, name)| Block {
                id: i64::try_from(i).unwrap() + 1,
                order: 0,
                content: BlockContent::Image {
                    image: MediaBlock {
                        id: 0,
                        filename: (*name).to_owned(),
                        link: None,
                    },
                },
            })
            .collect();
        blocks.push(Block {
            id: 99,
            order: 0,
            content: BlockContent::Heading {
                heading: HeadingBlock {
                    level: 1,
                    text: "Title".into(),
                },
            },
        });
        BlogPost {
            id: Some("p1".into()),
            title: "Post".into(),
            blocks,
            ..BlogPost::default()
        }
    }

    #[tokio::test]
    async fn presigns_stored_media() {
        let uploader = MemoryUploader::new();
        let key = uploader
            .upload("images", "cat.png", "image/png", "1", Bytes::new())
            .await
            .unwrap();
        let mut posts = vec![media_post(&[&key, ""])];

        attach_links(&mut posts, &uploader, DEFAULT_LINK_TTL).await;

        let blocks = &posts[0].blocks;
        assert_eq!(
            blocks[0].media().unwrap().link.as_deref(),
            Some(format!("memory://{key}?expires=900").as_str())
        );
        assert!(blocks[1].media().unwrap().link.is_none());
    }

    #[tokio::test]
    async fn presign_failure_omits_link() {
        let uploader = MemoryUploader::new();
        let mut posts = vec![media_post(&["images/missing.png"])];

        attach_links(&mut posts, &uploader, DEFAULT_LINK_TTL).await;

        assert!(posts[0].blocks[0].media().unwrap().link.is_none());
        assert_eq!(posts[0].blocks[0].media().unwrap().filename, "images/missing.png");
    }
}
