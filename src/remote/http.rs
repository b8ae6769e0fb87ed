//! HTTP remote store
//!
//! Creates nodes through the document store's collection ingest endpoint using a
//! multipart form: a `meta` JSON field and, for files, a streamed `file` part.

use crate::config::RemoteConfig;
use crate::error::{SetupError, TransportError};
use crate::remote::{NodeMetadata, ProgressEvent, ProgressSink, RemoteStore};
use crate::tree::node::ContentHandle;
use crate::types::{RemoteId, RemoteRef};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Size of each body chunk; progress is reported once per chunk
const CHUNK_SIZE: usize = 64 * 1024;

/// `RemoteStore` backed by the document store's HTTP API
pub struct HttpRemoteStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct IngestResponse {
    id: serde_json::Value,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self, SetupError> {
        config
            .validate()
            .map_err(|e| SetupError::Invalid(format!("remote: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SetupError::Client)?;
        Ok(Self {
            client,
            endpoint: config.normalized_endpoint(),
            api_key: config.api_key.clone(),
        })
    }

    /// Ingest URL for a collection
    pub fn ingest_url(&self, collection_id: &str) -> String {
        format!(
            "{}/api/2/collections/{}/ingest",
            self.endpoint.trim_end_matches('/'),
            collection_id
        )
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create_node(
        &self,
        collection_id: &str,
        metadata: NodeMetadata,
        content: Option<ContentHandle>,
        on_progress: Option<ProgressSink>,
    ) -> Result<RemoteRef, TransportError> {
        let meta = serde_json::to_string(&metadata)
            .map_err(|e| TransportError::Rejected(format!("unserializable metadata: {}", e)))?;
        let mut form = Form::new().text("meta", meta);

        if let Some(content) = content {
            let bytes = content.read().await?;
            let len = bytes.len() as u64;
            let body = reqwest::Body::wrap_stream(progress_stream(bytes, on_progress));
            let part = Part::stream_with_length(body, len)
                .file_name(content.name.clone())
                .mime_str(content.mime_type_or_default())?;
            form = form.part("file", part);
        }

        let url = self.ingest_url(collection_id);
        let mut request = self.client.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, format!("ApiKey {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let id = parse_remote_id(&body)?;
        debug!(url = %url, id = %id, file_name = %metadata.file_name, "Remote node created");

        let foreign_id = metadata
            .foreign_id
            .clone()
            .unwrap_or_else(|| metadata.file_name.clone());
        Ok(RemoteRef::new(id, foreign_id))
    }
}

/// Chunked body stream that reports cumulative progress as each chunk is pulled
fn progress_stream(
    bytes: Vec<u8>,
    sink: Option<ProgressSink>,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let total = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let mut loaded = 0u64;
    stream::iter(chunks).map(move |chunk| {
        loaded += chunk.len() as u64;
        if let Some(sink) = &sink {
            sink(ProgressEvent {
                loaded,
                total: Some(total),
            });
        }
        Ok::<_, std::io::Error>(chunk)
    })
}

fn parse_remote_id(body: &str) -> Result<RemoteId, TransportError> {
    let response: IngestResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::InvalidResponse(format!("{}: {}", e, body)))?;
    match response.id {
        serde_json::Value::String(id) if !id.is_empty() => Ok(RemoteId(id)),
        serde_json::Value::Number(id) => Ok(RemoteId(id.to_string())),
        other => Err(TransportError::InvalidResponse(format!(
            "unusable node id: {}",
            other
        ))),
    }
}
