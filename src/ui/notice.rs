use rfd::{MessageButtons, MessageDialog, MessageLevel};

use crate::state::controller::UploadError;

const DIALOG_TITLE: &str = "Image Processing Pipeline";

/// Show the user-facing notice for a controller error (blocks until dismissed)
pub fn show(err: &UploadError) {
    let level = match err {
        UploadError::NotReady | UploadError::InvalidInput(_) => MessageLevel::Warning,
        UploadError::ConnectionFailure(_) | UploadError::RequestFailure(_) => MessageLevel::Error,
    };
    show_message(level, err.notice());
}

/// Show a free-form notice
pub fn show_message(level: MessageLevel, description: &str) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(DIALOG_TITLE)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}
