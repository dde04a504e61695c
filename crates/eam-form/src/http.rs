//! HTTP [`AssetSink`] for the ingestion endpoint.

use std::time::Duration;

use eam_core::{
  payload::SubmissionPayload,
  sink::{AssetSink, SinkError, SinkResponse, interpret_response},
};
use reqwest::Client;

/// Where the ingestion service listens by default.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/assets";

/// Posts payloads as JSON to a fixed URL. One attempt per submission, no
/// authentication.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpAssetSink {
  client:   Client,
  endpoint: String,
}

impl HttpAssetSink {
  pub fn new(endpoint: impl Into<String>) -> Result<Self, SinkError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| SinkError::Transport(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, endpoint: endpoint.into() })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }
}

impl AssetSink for HttpAssetSink {
  async fn submit(&self, payload: &SubmissionPayload) -> Result<SinkResponse, SinkError> {
    let resp = self
      .client
      .post(&self.endpoint)
      .json(payload)
      .send()
      .await
      .map_err(|e| SinkError::Transport(format!("POST {} failed: {e}", self.endpoint)))?;

    let status = resp.status().as_u16();
    let body = resp
      .bytes()
      .await
      .map_err(|e| SinkError::Transport(format!("reading response body: {e}")))?;

    interpret_response(status, &body)
  }
}
