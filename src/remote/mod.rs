/// Connection to the remote inference collaborator
///
/// This module handles:
/// - The `InferenceBackend` capability the controller sends requests through
/// - Establishing the startup connection (`connect`)
/// - The Gradio HTTP implementation (gradio.rs)

pub mod gradio;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::Settings;
use crate::state::data::UploadedFile;
use crate::state::results::ResultSet;

pub use gradio::GradioClient;

/// Errors from talking to the remote endpoint
///
/// Payloads are strings so the error can travel inside `Clone` UI messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
    #[error("remote app reported an error: {0}")]
    Prediction(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Http(err.to_string())
    }
}

/// A live session with the remote collaborator
#[async_trait]
pub trait InferenceBackend: Send + Sync + fmt::Debug {
    /// Send one image and wait for the ordered result set
    async fn process_image(&self, file: UploadedFile) -> Result<ResultSet, RemoteError>;
}

/// Shared, read-only handle created once at startup
pub type Handle = Arc<dyn InferenceBackend>;

/// Establish the startup connection. Called exactly once; no retry.
pub async fn connect(settings: Settings) -> Result<Handle, RemoteError> {
    info!(endpoint = %settings.endpoint, "🔌 Connecting to Gradio...");

    let client = GradioClient::connect(&settings).await?;
    info!(root = %client.root(), "✅ Connected successfully");
    Ok(Arc::new(client))
}
