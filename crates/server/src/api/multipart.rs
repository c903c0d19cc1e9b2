use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use bytes::Bytes;
use inkwell_core::CreateBlogPostRequest;
use inkwell_service::FileParts;

use crate::error::ServerError;

/// Part holding the JSON-encoded post request.
pub const METADATA_PART: &str = "metadata";
/// Part holding an avatar image.
pub const AVATAR_PART: &str = "file";

fn bad_multipart(e: &MultipartError) -> ServerError {
    ServerError::BadRequest(format!("invalid multipart body: {}", e.body_text()))
}

/// Block index of a `block_{i}_file` part name.
fn block_index(name: &str) -> Option<usize> {
    name.strip_prefix("block_")?
        .strip_suffix("_file")?
        .parse()
        .ok()
}

/// Split a post form into its request and the media bytes by block index.
pub async fn read_post_form(
    mut multipart: Multipart,
) -> Result<(CreateBlogPostRequest, FileParts), ServerError> {
    let mut request = None;
    let mut files = FileParts::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| bad_multipart(&e))? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == METADATA_PART {
            let text = field.text().await.map_err(|e| bad_multipart(&e))?;
            let parsed: CreateBlogPostRequest = serde_json::from_str(&text)
                .map_err(|e| ServerError::BadRequest(format!("invalid metadata: {e}")))?;
            request = Some(parsed);
        } else if let Some(index) = block_index(&name) {
            let data = field.bytes().await.map_err(|e| bad_multipart(&e))?;
            files.insert(index, data);
        }
    }

    let request = request
        .ok_or_else(|| ServerError::BadRequest(format!("missing `{METADATA_PART}` part")))?;
    Ok((request, files))
}

/// Read the avatar part. Returns the client filename and the bytes.
pub async fn read_avatar_form(mut multipart: Multipart) -> Result<(String, Bytes), ServerError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| bad_multipart(&e))? {
        if field.name() != Some(AVATAR_PART) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or("avatar.png")
            .to_owned();
        let data = field.bytes().await.map_err(|e| bad_multipart(&e))?;
        if data.is_empty() {
            return Err(ServerError::BadRequest("avatar file is empty".into()));
        }
        return Ok((filename, data));
    }
    Err(ServerError::BadRequest(format!(
        "missing `{AVATAR_PART}` part"
    )))
}
