/// Upload/render controller
///
/// Owns the UI state machine (Idle → Loading → ShowingResults → Idle),
/// validates input and decides when an inference request goes out.
/// It never performs I/O itself: a successful selection hands back a
/// `PendingRequest` that the application shell runs as a background task.

use iced::widget::image::Handle as ImageHandle;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::data::{ConnectionStatus, Slot, UiState, UploadedFile};
use super::results::{ResultSet, ResultSlots};
use crate::remote::{Handle, RemoteError};

/// Failures surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Startup could not establish a handle
    #[error("connection to the inference endpoint failed: {0}")]
    ConnectionFailure(String),
    /// User acted before the handle existed
    #[error("inference endpoint is not connected yet")]
    NotReady,
    /// Declared media type is not an image type
    #[error("not an image file (declared type {0:?})")]
    InvalidInput(String),
    /// The inference call rejected or errored
    #[error("image processing failed: {0}")]
    RequestFailure(String),
}

impl UploadError {
    /// Text of the notice shown to the user
    pub fn notice(&self) -> &'static str {
        match self {
            UploadError::ConnectionFailure(_) => "Could not connect to the image processing service.",
            UploadError::NotReady => "Gradio client not connected yet. Please wait.",
            UploadError::InvalidInput(_) => "Please upload an image file.",
            UploadError::RequestFailure(_) => "Error processing image. Check the log for details.",
        }
    }
}

/// One accepted selection, ready to be sent
#[derive(Debug)]
pub struct PendingRequest {
    handle: Handle,
    file: UploadedFile,
}

impl PendingRequest {
    /// Issue the inference call and wait for its single response
    pub async fn send(self) -> Result<ResultSet, RemoteError> {
        self.handle.process_image(self.file).await
    }
}

/// Controller state
#[derive(Debug, Default)]
pub struct Controller {
    connection: ConnectionStatus,
    handle: Option<Handle>,
    ui: UiState,
    slots: ResultSlots,
    selected: Option<String>,
    drag_over: bool,
    /// Set by a hover, spent by the first drop that follows it
    drop_armed: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn ui(&self) -> UiState {
        self.ui
    }

    pub fn is_loading(&self) -> bool {
        self.ui == UiState::Loading
    }

    pub fn slots(&self) -> &ResultSlots {
        &self.slots
    }

    /// Name of the file behind the current or last request
    pub fn selected_file(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    /// Startup connection succeeded
    pub fn on_connected(&mut self, handle: Handle) {
        if self.connection != ConnectionStatus::Connecting {
            warn!("Ignoring late connection result");
            return;
        }
        self.handle = Some(handle);
        self.connection = ConnectionStatus::Connected;
    }

    /// Startup connection failed. There is no retry.
    pub fn on_connection_failed(&mut self, reason: String) -> UploadError {
        if self.connection == ConnectionStatus::Connecting {
            self.connection = ConnectionStatus::Failed(reason.clone());
        }
        UploadError::ConnectionFailure(reason)
    }

    /// Gate run before a chosen file is read from disk
    ///
    /// * `Ok(true)` - go ahead and read it
    /// * `Ok(false)` - a request is in flight, drop the choice silently
    /// * `Err(NotReady)` - no handle yet
    pub fn check_ready(&self) -> Result<bool, UploadError> {
        if self.ui == UiState::Loading {
            debug!("Request in flight, ignoring selection");
            return Ok(false);
        }
        if self.handle.is_none() {
            return Err(UploadError::NotReady);
        }
        Ok(true)
    }

    /// A file was dropped on the window
    ///
    /// Only the first file of a multi-file drop counts, and only while the
    /// drop zone is showing.
    pub fn accept_drop(&mut self) -> bool {
        let armed = std::mem::take(&mut self.drop_armed);
        self.drag_over = false;

        if !armed {
            debug!("Ignoring extra dropped file");
            return false;
        }
        if self.ui != UiState::Idle {
            debug!(ui = ?self.ui, "Drop zone hidden, ignoring dropped file");
            return false;
        }
        true
    }

    /// A file was picked or dropped
    ///
    /// * `Ok(Some(_))` - accepted, UI is now Loading, send the request
    /// * `Ok(None)` - ignored because a request is already in flight
    /// * `Err(_)` - rejected, nothing changed, show the notice
    pub fn select_file(
        &mut self,
        file: UploadedFile,
    ) -> Result<Option<PendingRequest>, UploadError> {
        if self.ui == UiState::Loading {
            debug!(file = %file.name, "Request in flight, ignoring selection");
            return Ok(None);
        }

        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => return Err(UploadError::NotReady),
        };

        if !file.is_image() {
            return Err(UploadError::InvalidInput(file.media_type));
        }

        info!(
            file = %file.name,
            media_type = %file.media_type,
            bytes = file.size(),
            "Processing image..."
        );

        self.selected = Some(file.name.clone());
        self.drag_over = false;
        self.ui = UiState::Loading;

        Ok(Some(PendingRequest { handle, file }))
    }

    /// The inference call returned. Returns the slots that need their image loaded.
    pub fn on_request_complete(&mut self, results: &ResultSet) -> Vec<(Slot, String)> {
        let assigned = self.slots.apply(results);
        if results.is_empty() {
            warn!("Result set is empty, keeping previous images");
        } else if assigned.len() < Slot::ALL.len() {
            warn!(
                received = results.len(),
                assigned = assigned.len(),
                "Result set did not fill every slot"
            );
        }
        self.ui = UiState::ShowingResults;
        assigned
    }

    /// The inference call failed
    pub fn on_request_failure(&mut self, reason: String) -> UploadError {
        self.ui = UiState::Idle;
        UploadError::RequestFailure(reason)
    }

    /// A slot finished loading (or failed to load) its image
    pub fn on_slot_loaded(&mut self, slot: Slot, source: &str, result: Result<ImageHandle, String>) {
        let current = match result {
            Ok(image) => self.slots.set_loaded(slot, source, image),
            Err(_) => self.slots.set_failed(slot, source),
        };
        if !current {
            debug!(?slot, "Discarding image for a replaced source");
        }
    }

    /// Back to the drop zone, whatever was showing
    pub fn reset(&mut self) {
        self.ui = UiState::Idle;
        self.selected = None;
        self.drag_over = false;
        self.drop_armed = false;
    }

    /// Files are hovering over the window. Sent once per hovered file.
    pub fn drag_enter(&mut self) {
        self.drag_over = true;
        self.drop_armed = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
        self.drop_armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InferenceBackend;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Backend that records every call and answers with a canned result
    #[derive(Debug, Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<UploadedFile>>,
        response: Vec<Value>,
    }

    impl RecordingBackend {
        fn answering(response: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                response,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InferenceBackend for RecordingBackend {
        async fn process_image(&self, file: UploadedFile) -> Result<ResultSet, RemoteError> {
            self.calls.lock().unwrap().push(file);
            Ok(ResultSet::from(self.response.clone()))
        }
    }

    fn png(len: usize) -> UploadedFile {
        UploadedFile::new("photo.png", "image/png", vec![0x89; len])
    }

    fn connected(backend: &Arc<RecordingBackend>) -> Controller {
        let mut controller = Controller::new();
        let handle: Handle = backend.clone();
        controller.on_connected(handle);
        controller
    }

    fn letters() -> Vec<Value> {
        ["a", "b", "c", "d", "e", "f"].iter().map(|s| json!(s)).collect()
    }

    #[tokio::test]
    async fn test_drop_png_issues_one_request_and_fills_slots() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = connected(&backend);

        let request = controller
            .select_file(png(2000))
            .expect("accepted")
            .expect("request issued");
        assert_eq!(controller.ui(), UiState::Loading);
        assert_eq!(controller.selected_file(), Some("photo.png"));

        let results = request.send().await.expect("response");
        {
            let calls = backend.calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].media_type, "image/png");
            assert_eq!(calls[0].bytes, vec![0x89; 2000]);
        }

        let assigned = controller.on_request_complete(&results);
        assert_eq!(assigned.len(), 6);
        assert_eq!(controller.ui(), UiState::ShowingResults);
        for (slot, expected) in Slot::ALL.iter().zip(["a", "b", "c", "d", "e", "f"]) {
            assert_eq!(controller.slots().source(*slot), Some(expected));
        }
    }

    #[test]
    fn test_not_ready_rejects_any_file() {
        let mut controller = Controller::new();

        for file in [png(10), UploadedFile::new("notes.txt", "text/plain", Vec::new())] {
            assert_eq!(controller.select_file(file).unwrap_err(), UploadError::NotReady);
            assert_eq!(controller.ui(), UiState::Idle);
            assert_eq!(controller.selected_file(), None);
        }
    }

    #[test]
    fn test_non_image_rejected_without_request() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = connected(&backend);

        for media_type in ["text/plain", "application/pdf", "video/mp4", "", "imagex/png"] {
            let file = UploadedFile::new("input", media_type, vec![1, 2, 3]);
            let err = controller.select_file(file).unwrap_err();
            assert_eq!(err, UploadError::InvalidInput(media_type.to_string()));
            assert_eq!(err.notice(), "Please upload an image file.");
            assert_eq!(controller.ui(), UiState::Idle);
            assert_eq!(controller.selected_file(), None);
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_rejection_keeps_results_showing() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = connected(&backend);
        controller.select_file(png(4)).unwrap();
        controller.on_request_complete(&ResultSet::from(letters()));

        let err = controller.select_file(UploadedFile::new("a.gif.txt", "text/plain", Vec::new()));
        assert!(matches!(err, Err(UploadError::InvalidInput(_))));
        assert_eq!(controller.ui(), UiState::ShowingResults);
        assert_eq!(controller.selected_file(), Some("photo.png"));
    }

    #[test]
    fn test_selection_while_loading_is_ignored() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = connected(&backend);

        assert!(controller.select_file(png(8)).unwrap().is_some());
        let second = UploadedFile::new("other.jpg", "image/jpeg", vec![0xFF, 0xD8]);
        assert!(controller.select_file(second).unwrap().is_none());

        assert_eq!(controller.ui(), UiState::Loading);
        assert_eq!(controller.selected_file(), Some("photo.png"));
    }

    #[test]
    fn test_malformed_elements_leave_slots_unchanged() {
        let backend = RecordingBackend::answering(Vec::new());
        let mut controller = connected(&backend);
        controller.select_file(png(4)).unwrap();
        controller.on_request_complete(&ResultSet::from(letters()));
        controller.reset();

        controller.select_file(png(4)).unwrap();
        let assigned = controller.on_request_complete(&ResultSet::from(vec![
            json!({"url": "A"}),
            json!(null),
            json!(17),
            json!({"path": "/tmp/x.png"}),
            json!("E"),
            json!({"url": ""}),
        ]));

        assert_eq!(assigned.len(), 2);
        assert_eq!(controller.ui(), UiState::ShowingResults);
        let sources: Vec<_> = Slot::ALL.iter().map(|s| controller.slots().source(*s)).collect();
        assert_eq!(
            sources,
            vec![Some("A"), Some("b"), Some("c"), Some("d"), Some("E"), Some("f")]
        );
    }

    #[test]
    fn test_failure_returns_to_idle() {
        let backend = RecordingBackend::answering(Vec::new());
        let mut controller = connected(&backend);
        controller.select_file(png(4)).unwrap();

        let err = controller.on_request_failure("upstream 500".to_string());
        assert_eq!(err, UploadError::RequestFailure("upstream 500".to_string()));
        assert_eq!(controller.ui(), UiState::Idle);
        assert!(!controller.is_loading());

        // Not stuck: the next selection goes out
        assert!(controller.select_file(png(4)).unwrap().is_some());
    }

    #[test]
    fn test_reset_from_every_state() {
        let backend = RecordingBackend::answering(letters());

        let mut idle = connected(&backend);
        idle.drag_enter();
        idle.reset();
        assert_eq!(idle.ui(), UiState::Idle);
        assert!(!idle.is_drag_over());

        let mut loading = connected(&backend);
        loading.select_file(png(4)).unwrap();
        loading.reset();
        assert_eq!(loading.ui(), UiState::Idle);
        assert_eq!(loading.selected_file(), None);

        let mut showing = connected(&backend);
        showing.select_file(png(4)).unwrap();
        showing.on_request_complete(&ResultSet::from(letters()));
        showing.reset();
        assert_eq!(showing.ui(), UiState::Idle);
        assert_eq!(showing.selected_file(), None);
        assert_eq!(showing.slots().source(Slot::Edges), Some("f"));
    }

    #[test]
    fn test_connection_outcome_is_terminal() {
        let backend = RecordingBackend::answering(Vec::new());
        let mut controller = Controller::new();
        assert_eq!(controller.connection(), &ConnectionStatus::Connecting);

        let err = controller.on_connection_failed("dns".to_string());
        assert!(matches!(err, UploadError::ConnectionFailure(_)));
        assert_eq!(controller.connection(), &ConnectionStatus::Failed("dns".to_string()));

        let handle: Handle = backend.clone();
        controller.on_connected(handle);
        assert_eq!(controller.connection(), &ConnectionStatus::Failed("dns".to_string()));
        assert_eq!(controller.select_file(png(4)).unwrap_err(), UploadError::NotReady);
    }

    #[test]
    fn test_multi_file_drop_keeps_only_the_first() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = connected(&backend);

        // Two files hovered, then two dropped
        controller.drag_enter();
        controller.drag_enter();
        assert!(controller.accept_drop());
        assert!(!controller.accept_drop());
        assert!(!controller.is_drag_over());

        // The next drag starts a fresh batch
        controller.drag_enter();
        assert!(controller.accept_drop());
    }

    #[test]
    fn test_drop_without_hover_or_after_leave_is_ignored() {
        let mut controller = Controller::new();
        assert!(!controller.accept_drop());

        controller.drag_enter();
        controller.drag_leave();
        assert!(!controller.accept_drop());
    }

    #[test]
    fn test_drop_ignored_unless_drop_zone_showing() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = connected(&backend);
        controller.select_file(png(4)).unwrap();

        controller.drag_enter();
        assert!(!controller.accept_drop());

        controller.on_request_complete(&ResultSet::from(letters()));
        controller.drag_enter();
        assert!(!controller.accept_drop());
        assert_eq!(controller.ui(), UiState::ShowingResults);

        controller.reset();
        controller.drag_enter();
        assert!(controller.accept_drop());
    }

    #[test]
    fn test_readiness_checked_before_reading() {
        let backend = RecordingBackend::answering(letters());
        let mut controller = Controller::new();
        assert_eq!(controller.check_ready(), Err(UploadError::NotReady));

        let handle: Handle = backend.clone();
        controller.on_connected(handle);
        assert_eq!(controller.check_ready(), Ok(true));

        controller.select_file(png(4)).unwrap();
        assert_eq!(controller.check_ready(), Ok(false));

        controller.on_request_complete(&ResultSet::from(letters()));
        assert_eq!(controller.check_ready(), Ok(true));
    }

    #[test]
    fn test_slot_load_updates_current_source_only() {
        let backend = RecordingBackend::answering(Vec::new());
        let mut controller = connected(&backend);
        controller.select_file(png(4)).unwrap();
        controller.on_request_complete(&ResultSet::from(letters()));

        controller.on_slot_loaded(Slot::Denoised, "c", Ok(ImageHandle::from_bytes(vec![1u8])));
        controller.on_slot_loaded(Slot::Edges, "stale", Ok(ImageHandle::from_bytes(vec![1u8])));
        controller.on_slot_loaded(Slot::Enhanced, "e", Err("404".to_string()));

        assert!(controller.slots().get(Slot::Denoised).image.is_some());
        assert!(controller.slots().get(Slot::Edges).image.is_none());
        assert!(controller.slots().get(Slot::Enhanced).failed);
    }
}
