pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod render;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use api::{TriageApi, TriageClient};
pub use config::{Config, ConfigError, ConfigFile, Overrides, SchemaVersion};
pub use controller::{ChatController, Submission};
pub use error::TriageError;
pub use render::{format_response, Block, Markup, ProviderCard};
pub use types::{
    ApiErrorBody, Categories, HealthStatus, Message, MessageContent, Recommendations,
    RecommendedProvider, Sender, TriageRequest, TriageResponse,
};
pub use view::{InputField, MessageSink, SendControl, Transcript, BUSY_PLACEHOLDER, IDLE_PLACEHOLDER};
