use thiserror::Error;

/// Why a triage request did not produce a response.
///
/// Every variant is recoverable: the controller turns it into an assistant message.
#[derive(Error, Debug)]
pub enum TriageError {
    /// The service answered with a non-2xx status
    #[error("triage API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The request never completed (connection refused, timeout, reset...)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that does not match the configured response schema
    #[error("malformed triage response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The background task running the request died before reporting
    #[error("request task failed: {0}")]
    TaskFailed(String),
}

impl TriageError {
    /// Apology shown to the user in place of a triage result
    pub fn user_message(&self) -> String {
        match self {
            TriageError::Api { detail, .. } => {
                format!("Desculpe, o serviço de triagem retornou um erro: {}", detail)
            }
            TriageError::Transport(err) => format!(
                "Desculpe, ocorreu um erro de comunicação. Por favor, tente novamente mais tarde. ({})",
                err
            ),
            TriageError::TaskFailed(reason) => format!(
                "Desculpe, ocorreu um erro de comunicação. Por favor, tente novamente mais tarde. ({})",
                reason
            ),
            TriageError::Malformed(err) => format!(
                "Desculpe, a resposta do serviço de triagem não pôde ser interpretada. ({})",
                err
            ),
        }
    }
}
