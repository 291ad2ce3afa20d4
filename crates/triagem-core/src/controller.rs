//! Chat controller: the submit lifecycle
//!
//! A submission runs in two halves so an event-loop frontend can keep drawing while
//! the request is in flight:
//!
//! 1. [`ChatController::begin`] echoes the user's text, clears and disables the input,
//!    and shows the typing indicator. Everything here is synchronous.
//! 2. [`ChatController::finish`] hides the indicator, appends exactly one assistant
//!    message for the outcome, and re-enables the input.
//!
//! [`ChatController::submit`] runs both halves around the API call for callers that
//! can await inline.

use tracing::{debug, error, info, warn};

use crate::api::TriageApi;
use crate::error::TriageError;
use crate::render::format_response;
use crate::types::{Message, TriageResponse};
use crate::view::{InputField, MessageSink, SendControl, BUSY_PLACEHOLDER, IDLE_PLACEHOLDER};

/// Trimmed symptom text accepted by [`ChatController::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    text: String,
}

impl Submission {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[derive(Debug)]
pub struct ChatController<I, B, S, A> {
    input: I,
    send: B,
    messages: S,
    api: A,
    loading: bool,
    typing: bool,
}

impl<I, B, S, A> ChatController<I, B, S, A>
where
    I: InputField,
    B: SendControl,
    S: MessageSink,
    A: TriageApi,
{
    /// Take ownership of the UI handles and put them in the idle state
    pub fn new(mut input: I, mut send: B, messages: S, api: A) -> Self {
        input.set_enabled(true);
        input.set_placeholder(IDLE_PLACEHOLDER);
        send.set_enabled(true);

        Self {
            input,
            send,
            messages,
            api,
            loading: false,
            typing: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn send_control(&self) -> &B {
        &self.send
    }

    pub fn send_control_mut(&mut self) -> &mut B {
        &mut self.send
    }

    pub fn messages(&self) -> &S {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut S {
        &mut self.messages
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// First half of a submission.
    ///
    /// Returns `None`, touching nothing, when the trimmed input is empty or a request
    /// is already outstanding.
    pub fn begin(&mut self) -> Option<Submission> {
        if self.loading {
            debug!("submission ignored: a request is already in flight");
            return None;
        }

        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            return None;
        }

        info!(chars = text.chars().count(), "submitting symptoms");
        self.messages.append(Message::user(text.clone()));
        self.input.clear();
        self.set_loading(true);
        self.messages.show_typing();
        self.typing = true;

        Some(Submission { text })
    }

    /// Second half of a submission: report `outcome` and return to idle
    pub fn finish(&mut self, outcome: Result<TriageResponse, TriageError>) {
        if !self.loading {
            warn!("triage outcome arrived with no request in flight; dropping it");
            return;
        }

        self.hide_typing();

        let reply = match outcome {
            Ok(response) => {
                info!(classification = %response.classification, "triage succeeded");
                Message::assistant_markup(format_response(&response))
            }
            Err(err) => {
                match &err {
                    TriageError::Api { status, .. } => {
                        warn!(status, error = %err, "triage rejected by the service")
                    }
                    TriageError::Malformed(_) => warn!(error = %err, "triage response rejected"),
                    TriageError::Transport(_) | TriageError::TaskFailed(_) => {
                        error!(error = %err, "triage request failed")
                    }
                }
                Message::assistant_text(err.user_message())
            }
        };

        self.messages.append(reply);
        self.set_loading(false);
        self.input.focus();
    }

    /// Full submission: `begin`, the API call, then `finish`
    pub async fn submit(&mut self) {
        let Some(submission) = self.begin() else {
            return;
        };

        let outcome = self.api.triage(submission.text()).await;
        self.finish(outcome);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.input.set_enabled(!loading);
        self.send.set_enabled(!loading);
        self.input.set_placeholder(if loading {
            BUSY_PLACEHOLDER
        } else {
            IDLE_PLACEHOLDER
        });
    }

    fn hide_typing(&mut self) {
        if self.typing {
            self.messages.hide_typing();
            self.typing = false;
        }
    }
}
