use rfd::FileDialog;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::state::data::{UploadedFile, UNKNOWN_MEDIA_TYPE};

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "ico", "avif",
];

/// Show the native file picker, restricted to images
pub fn pick_image() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select an image to process")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

/// Media type a browser would declare for this file
///
/// Comes from the extension. Files with no recognised extension are
/// sniffed from their leading bytes, then fall back to a generic binary type.
pub fn declared_media_type(path: &Path, bytes: &[u8]) -> String {
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        return mime.to_string();
    }

    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_string(),
        Err(_) => UNKNOWN_MEDIA_TYPE.to_string(),
    }
}

/// Read a file from disk into an upload
pub async fn read_upload(path: PathBuf) -> Result<UploadedFile, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let media_type = declared_media_type(&path, &bytes);

    debug!(file = %name, media_type = %media_type, bytes = bytes.len(), "Read upload");

    Ok(UploadedFile::new(name, media_type, bytes))
}
