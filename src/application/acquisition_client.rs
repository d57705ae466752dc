// Acquisition client trait - Fetches the current signal reading from a router
use crate::domain::endpoint::Endpoint;
use crate::domain::reading::RawReading;
use async_trait::async_trait;
use thiserror::Error;

/// Any reason a fetch did not produce a reading. The session only ever
/// displays the cause; it never branches on the variant.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("request to router failed: {0}")]
    Transport(String),
    #[error("router returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("router returned error code {code}{}", fmt_message(.message))]
    Device { code: String, message: String },
    #[error("unexpected router response: {0}")]
    Malformed(String),
}

fn fmt_message(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" ({})", message)
    }
}

#[async_trait]
pub trait AcquisitionClient: Send + Sync {
    /// Fetch the current signal metrics as a string-keyed mapping
    async fn fetch_metrics(&self, endpoint: &Endpoint) -> Result<RawReading, AcquisitionError>;
}
