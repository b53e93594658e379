use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::reading::{short_id, Reading};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SendError {
    #[error("unexpected response. Status: {status}, Body: {body}")]
    Rejected { status: u16, body: String },
    #[error("could not reach the API. Error: {0}")]
    Unreachable(#[from] reqwest::Error),
}

impl SendError {
    /// Log label: a rejection is an `ERROR`, a transport failure is `FATAL`
    /// for this send only.
    pub fn label(&self) -> &'static str {
        match self {
            SendError::Rejected { .. } => "ERROR",
            SendError::Unreachable(_) => "FATAL",
        }
    }
}

/// Destination for readings. Implementations make a single delivery attempt.
#[async_trait]
pub trait ReadingSink {
    async fn send(&self, reading: &Reading) -> Result<(), SendError>;
}

/// POSTs readings as JSON to the ingestion API.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReadingSink for HttpSink {
    async fn send(&self, reading: &Reading) -> Result<(), SendError> {
        let response = self.client.post(&self.endpoint).json(reading).send().await?;

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Ok(());
        }
        // a body that cannot be read is a transport failure, not a rejection
        let body = response.text().await?;
        Err(SendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Human-readable outcome of one send, keyed by the container's short id.
pub fn report_line(reading: &Reading, result: &Result<(), SendError>) -> String {
    let container = short_id(&reading.container_id);
    match result {
        Ok(()) => format!(
            "[OK] Container {}: reading sent (level: {}%)",
            container, reading.fill_level
        ),
        Err(e) => format!("[{}] Container {}: {}", e.label(), container, e),
    }
}
