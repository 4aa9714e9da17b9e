//! Gradio HTTP client
//!
//! Speaks the queue-based HTTP API exposed by every Gradio app:
//! upload the file, start a call, then read the event stream for the result.

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{InferenceBackend, RemoteError};
use crate::config::Settings;
use crate::state::data::UploadedFile;
use crate::state::results::ResultSet;

const FILE_DATA_TYPE: &str = "gradio.FileData";

#[derive(Debug, Deserialize)]
struct SpaceHost {
    host: String,
}

#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    api_prefix: Option<String>,
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
struct Dependency {
    // String for named endpoints, `false`/null for hidden ones
    #[serde(default)]
    api_name: Value,
}

impl AppConfig {
    fn exposes(&self, api_name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|dep| dep.api_name.as_str() == Some(api_name))
    }
}

#[derive(Debug, Deserialize)]
struct CallStarted {
    event_id: String,
}

/// Connected Gradio app
#[derive(Debug, Clone)]
pub struct GradioClient {
    http: Client,
    root: String,
    api_prefix: String,
    api_name: String,
}

impl GradioClient {
    /// Resolve the app root and read its config
    pub async fn connect(settings: &Settings) -> Result<Self, RemoteError> {
        let http = Client::builder().build()?;
        let root = resolve_root(&http, &settings.hub_url, &settings.endpoint).await?;

        let config: AppConfig = http
            .get(format!("{root}/config"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let api_prefix = config
            .api_prefix
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let api_name = settings.api_name.trim_start_matches('/').to_string();

        if !config.dependencies.is_empty() && !config.exposes(&api_name) {
            warn!(api_name = %api_name, "App config does not list this endpoint, calling it anyway");
        }

        info!(
            root = %root,
            version = config.version.as_deref().unwrap_or("unknown"),
            api_prefix = %api_prefix,
            "Gradio app config loaded"
        );

        Ok(Self {
            http,
            root,
            api_prefix,
            api_name,
        })
    }

    /// Base URL of the app (no trailing slash)
    pub fn root(&self) -> &str {
        &self.root
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.root, self.api_prefix, path)
    }

    /// Upload the file and return its server-side path
    async fn upload(&self, name: &str, media_type: &str, bytes: Vec<u8>) -> Result<String, RemoteError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(media_type)?;
        let form = multipart::Form::new().part("files", part);

        let paths: Vec<String> = self
            .http
            .post(self.api_url("/upload"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        paths
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Protocol("upload returned no file paths".to_string()))
    }

    /// Queue a call with the uploaded file as the only input
    async fn start_call(&self, input: Value) -> Result<String, RemoteError> {
        let started: CallStarted = self
            .http
            .post(self.api_url(&format!("/call/{}", self.api_name)))
            .json(&json!({ "data": [input] }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(started.event_id)
    }

    /// Read the event stream of a queued call until it completes
    async fn await_result(&self, event_id: &str) -> Result<Vec<Value>, RemoteError> {
        let body = self
            .http
            .get(self.api_url(&format!("/call/{}/{}", self.api_name, event_id)))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_event_stream(&body)
    }

    /// Give file records without a usable `url` one pointing at the app's file route
    fn normalize(&self, value: Value) -> Value {
        match value {
            Value::Object(mut record) => {
                let has_url = record
                    .get("url")
                    .and_then(Value::as_str)
                    .is_some_and(|url| !url.is_empty());
                if !has_url {
                    if let Some(path) = record.get("path").and_then(Value::as_str) {
                        let url = self.api_url(&format!("/file={path}"));
                        record.insert("url".to_string(), Value::String(url));
                    }
                }
                Value::Object(record)
            }
            other => other,
        }
    }
}

#[async_trait]
impl InferenceBackend for GradioClient {
    async fn process_image(&self, file: UploadedFile) -> Result<ResultSet, RemoteError> {
        let UploadedFile {
            name,
            media_type,
            bytes,
        } = file;
        let size = bytes.len();

        let path = self.upload(&name, &media_type, bytes).await?;
        debug!(path = %path, "Uploaded input image");

        let input = json!({
            "path": path,
            "orig_name": name,
            "mime_type": media_type,
            "size": size,
            "meta": { "_type": FILE_DATA_TYPE },
        });
        let event_id = self.start_call(input).await?;
        debug!(event_id = %event_id, "Call queued");

        let items = self.await_result(&event_id).await?;
        info!(count = items.len(), "Result received");

        Ok(ResultSet::new(
            items.into_iter().map(|item| self.normalize(item)).collect(),
        ))
    }
}

/// Turn an endpoint identifier into the app's base URL
///
/// Full URLs are used as-is; `owner/name` Space ids are looked up on the hub.
async fn resolve_root(http: &Client, hub_url: &str, endpoint: &str) -> Result<String, RemoteError> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(endpoint.trim_end_matches('/').to_string());
    }

    let is_space_id = matches!(
        endpoint.split_once('/'),
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
    );
    if !is_space_id {
        return Err(RemoteError::Protocol(format!(
            "endpoint {endpoint:?} is neither a URL nor an owner/name Space id"
        )));
    }

    let host: SpaceHost = http
        .get(format!("{}/api/spaces/{}/host", hub_url.trim_end_matches('/'), endpoint))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(host.host.trim_end_matches('/').to_string())
}

/// Extract the result array from a server-sent event stream
pub fn parse_event_stream(body: &str) -> Result<Vec<Value>, RemoteError> {
    let normalized = body.replace("\r\n", "\n");

    for block in normalized.split("\n\n") {
        let mut event = None;
        let mut data_lines = Vec::new();

        for line in block.lines() {
            if let Some(name) = line.strip_prefix("event:") {
                event = Some(name.trim());
            } else if let Some(data) = line.strip_prefix("data:") {
                data_lines.push(data.trim_start());
            }
        }
        let data = data_lines.join("\n");

        match event {
            Some("complete") => {
                return match serde_json::from_str::<Value>(&data) {
                    Ok(Value::Array(items)) => Ok(items),
                    Ok(other) => Err(RemoteError::Protocol(format!(
                        "complete event carried {other} instead of an array"
                    ))),
                    Err(err) => Err(RemoteError::Protocol(format!(
                        "complete event is not valid JSON: {err}"
                    ))),
                };
            }
            Some("error") => {
                let message = match serde_json::from_str::<Value>(&data) {
                    Ok(Value::String(message)) => message,
                    Ok(Value::Null) => "no details given".to_string(),
                    _ if data.trim().is_empty() => "no details given".to_string(),
                    _ => data,
                };
                return Err(RemoteError::Prediction(message));
            }
            _ => {}
        }
    }

    Err(RemoteError::Protocol(
        "event stream ended without a result".to_string(),
    ))
}
