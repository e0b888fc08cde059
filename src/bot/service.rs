//! Move service client.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Move service error with location tracking.
///
/// Covers every transport failure: unreachable host, non-2xx status,
/// undecodable body and timeout.
#[derive(Debug, Clone, Display, Error)]
#[display("Move service error: {} at {}:{}", message, file, line)]
pub struct MoveServiceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl MoveServiceError {
    /// Creates a new move service error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Something that suggests a move for a position.
#[async_trait::async_trait]
pub trait MoveService: Send + Sync {
    /// Requests a move for the position `fen`.
    ///
    /// `Ok(None)` means the service answered without a suggestion.
    async fn request_move(&self, fen: &str) -> Result<Option<String>, MoveServiceError>;

    /// Endpoint or label used in logs.
    fn name(&self) -> &str;
}

/// Request body sent to the move service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Position to search.
    pub fen: String,
}

/// Response body returned by the move service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Suggested move token, absent or null for no suggestion.
    #[serde(rename = "move", default)]
    pub best_move: Option<String>,
}

/// JSON-over-HTTP move service.
#[derive(Debug, Clone)]
pub struct HttpMoveService {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpMoveService {
    /// Creates a client posting to `endpoint`.
    #[instrument(skip_all)]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        info!(endpoint = %endpoint, "Creating HTTP move service client");
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl MoveService for HttpMoveService {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn request_move(&self, fen: &str) -> Result<Option<String>, MoveServiceError> {
        debug!("Sending move request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&MoveRequest {
                fen: fen.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Move service request failed");
                MoveServiceError::new(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Move service returned error status");
            return Err(MoveServiceError::new(format!(
                "Move service returned status {}",
                status
            )));
        }

        let body: MoveResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to decode move service response");
            MoveServiceError::new(format!("Undecodable response: {}", e))
        })?;

        let suggestion = body.best_move.filter(|token| !token.is_empty());
        debug!(suggestion = ?suggestion, "Move service responded");
        Ok(suggestion)
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}
