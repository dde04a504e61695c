//! The remote ingestion collaborator.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

use crate::payload::SubmissionPayload;

/// Message used when a failed response carries none of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Failed to save asset";

/// A successful ingestion outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkResponse {
  pub status:  u16,
  pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum SinkError {
  #[error("transport error: {0}")]
  Transport(String),

  #[error("server returned {status}: {message}")]
  Status { status: u16, message: String },

  #[error("server reported an error: {0}")]
  Rejected(String),

  #[error("malformed response: {0}")]
  MalformedResponse(String),
}

/// Delivers a payload to wherever assets are ingested. One attempt per call;
/// retries are the caller's decision.
pub trait AssetSink: Send + Sync {
  fn submit<'a>(
    &'a self,
    payload: &'a SubmissionPayload,
  ) -> impl Future<Output = Result<SinkResponse, SinkError>> + Send + 'a;
}

#[derive(Deserialize)]
struct ResponseBody {
  message: Option<String>,
  error:   Option<String>,
}

/// Interpret an ingestion response. The body must be JSON. A non-2xx status
/// fails, and so does an `error` field inside a 2xx body.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<SinkResponse, SinkError> {
  let parsed: ResponseBody = serde_json::from_slice(body).map_err(|e| {
    SinkError::MalformedResponse(format!("status {status}: {e}"))
  })?;

  if !(200..300).contains(&status) {
    let message = parsed
      .message
      .or(parsed.error)
      .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_owned());
    return Err(SinkError::Status { status, message });
  }

  if let Some(error) = parsed.error {
    return Err(SinkError::Rejected(error));
  }

  Ok(SinkResponse { status, message: parsed.message })
}
