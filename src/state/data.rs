/// Shared data structures for the application state
///
/// These types flow between the file loader, the remote layer,
/// the controller and the render function.

use std::fmt;

/// Media type used when neither the extension nor the content identifies the file
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A user-supplied file waiting to be sent to the inference endpoint
///
/// Lives only for the duration of one request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name only (e.g., "photo.png")
    pub name: String,
    /// Declared media type (e.g., "image/png")
    pub media_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Whether the declared media type is an image type
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Payload size in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Print the size instead of dumping the whole payload into logs
impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The six named display slots
///
/// The remote pipeline returns its images in this exact order and carries
/// no names, so the position in a result set is the only key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Resized,
    Grayscale,
    Denoised,
    NoiseMap,
    Enhanced,
    Edges,
}

impl Slot {
    /// All slots in result-set order
    pub const ALL: [Slot; 6] = [
        Slot::Resized,
        Slot::Grayscale,
        Slot::Denoised,
        Slot::NoiseMap,
        Slot::Enhanced,
        Slot::Edges,
    ];

    /// Position of this slot in a result set
    pub fn index(self) -> usize {
        self as usize
    }

    /// Caption shown above the slot
    pub fn label(self) -> &'static str {
        match self {
            Slot::Resized => "Resized Image",
            Slot::Grayscale => "Grayscale Image",
            Slot::Denoised => "Denoised Image",
            Slot::NoiseMap => "Noise Removed",
            Slot::Enhanced => "Enhanced Image (CLAHE)",
            Slot::Edges => "Edge Detection",
        }
    }
}

/// Which screen is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    /// Drop zone visible, waiting for a file
    #[default]
    Idle,
    /// One inference request in flight
    Loading,
    /// Results panel visible, drop zone hidden
    ShowingResults,
}

/// Lifecycle of the startup connection. Terminal on the first outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Failed(String),
}
