/// Media I/O module
///
/// This module handles:
/// - Reading a picked or dropped file into an `UploadedFile` (upload.rs)
/// - Loading the bytes behind a result image reference (source.rs)

pub mod source;
pub mod upload;
