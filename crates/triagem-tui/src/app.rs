use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::error;
use triagem_core::{
    ChatController, Config, InputField, TriageApi, TriageClient, TriageError, TriageResponse,
};

use crate::widgets::{ChatLog, SendButton, TextInput};

pub type Controller = ChatController<TextInput, SendButton, ChatLog, TriageClient>;

type PendingTriage = JoinHandle<Result<TriageResponse, TriageError>>;

pub struct App {
    pub should_quit: bool,
    pub controller: Controller,

    // The request spawned by the last submission, if it has not been reported yet
    pub pending: Option<PendingTriage>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_area: Option<Rect>,

    pub endpoint_label: String,
}

impl App {
    pub fn new(config: &Config) -> Result<Self, TriageError> {
        let client = TriageClient::new(config)?;
        let endpoint_label = format!("{} ({})", client.endpoint(), client.schema());

        Ok(Self {
            should_quit: false,
            controller: ChatController::new(
                TextInput::default(),
                SendButton::default(),
                ChatLog::default(),
                client,
            ),
            pending: None,
            animation_frame: 0,
            chat_area: None,
            send_area: None,
            endpoint_label,
        })
    }

    /// Start a submission; the request runs on its own task until `poll_pending` reports it
    pub fn submit(&mut self) {
        let Some(submission) = self.controller.begin() else {
            return;
        };

        let client = self.controller.api().clone();
        self.pending = Some(tokio::spawn(async move {
            client.triage(submission.text()).await
        }));
    }

    /// Hand a finished request to the controller. Cheap when nothing is in flight.
    pub async fn poll_pending(&mut self) {
        if !self.pending.as_ref().is_some_and(|task| task.is_finished()) {
            return;
        }
        let Some(task) = self.pending.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "triage task did not complete");
                Err(TriageError::TaskFailed(e.to_string()))
            }
        };
        self.controller.finish(outcome);

        // The controller refocuses the input; the button gives up focus with it
        if self.controller.input().is_focused() {
            self.controller.send_control_mut().set_focused(false);
        }
    }

    pub fn toggle_focus(&mut self) {
        if self.controller.input().is_focused() {
            self.controller.input_mut().blur();
            self.controller.send_control_mut().set_focused(true);
        } else {
            self.controller.send_control_mut().set_focused(false);
            self.controller.input_mut().focus();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.controller.messages_mut().scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.controller.messages_mut().scroll_down(lines);
    }
}
