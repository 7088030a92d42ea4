use reqwest::{Response, StatusCode};
use thiserror::Error;

use shared::error::ErrorBody;

/// Failure of one relay round trip. `Rejected` carries the message the relay
/// put in its `{error}` body; everything else is `Transport`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Builds a `Rejected` from a non-success response, falling back to a
    /// generic message when the body carries no usable `{error}` field.
    pub(crate) async fn from_rejection(response: Response) -> Self {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) if !body.error.is_empty() => body.error,
            _ => format!("relay rejected request with status {status}"),
        };
        ClientError::Rejected { status, message }
    }

    /// Text fit for a status badge: the relay's own words when it gave any.
    pub fn surface_message(&self) -> String {
        self.to_string()
    }
}
