/// Loader for result image references
///
/// A reference is either an `http(s)` URL served by the remote app or an
/// inline `data:` URL. The bytes are handed to the image widget as-is.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;

use crate::remote::RemoteError;

/// Fetch or decode the bytes behind a reference
pub async fn load_image_source(http: Client, source: String) -> Result<Vec<u8>, RemoteError> {
    if let Some(rest) = source.strip_prefix("data:") {
        return decode_data_url(rest);
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        let bytes = http
            .get(&source)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        return Ok(bytes.to_vec());
    }

    let preview: String = source.chars().take(64).collect();
    Err(RemoteError::Protocol(format!("unsupported image source: {preview}")))
}

/// Decode the part of a data URL after `data:`
fn decode_data_url(rest: &str) -> Result<Vec<u8>, RemoteError> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RemoteError::Protocol("data URL has no payload".to_string()))?;

    if !meta.ends_with(";base64") {
        return Err(RemoteError::Protocol(
            "only base64 data URLs are supported".to_string(),
        ));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| RemoteError::Protocol(format!("invalid base64 image data: {e}")))
}
