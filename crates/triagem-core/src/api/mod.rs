pub mod client;

pub use client::{decode_response, TriageClient};

use async_trait::async_trait;

use crate::error::TriageError;
use crate::types::TriageResponse;

/// The remote triage service, as seen by the chat controller
#[async_trait]
pub trait TriageApi: Send + Sync {
    /// Send one symptom description and wait for the classification
    async fn triage(&self, symptoms: &str) -> Result<TriageResponse, TriageError>;
}
