//! Non-interactive view for `triagem ask`: the input holds a fixed text and messages
//! are printed as they are appended.

use std::io::Write;

use triagem_core::{InputField, Message, MessageSink, SendControl, Sender};

/// Input field preloaded with the symptoms given on the command line
#[derive(Debug, Default)]
pub struct PresetInput {
    text: String,
}

impl PresetInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl InputField for PresetInput {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn set_enabled(&mut self, _enabled: bool) {}

    fn set_placeholder(&mut self, _placeholder: &str) {}

    fn focus(&mut self) {}
}

/// There is no button to press in one-shot mode
#[derive(Debug, Default)]
pub struct NoButton;

impl SendControl for NoButton {
    fn set_enabled(&mut self, _enabled: bool) {}
}

/// Writes each appended message to `out`, as plain text or as an HTML bubble
pub struct PrintSink<W> {
    out: W,
    html: bool,
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W, html: bool) -> Self {
        Self { out, html }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn render(&self, message: &Message) -> String {
        if self.html {
            let class = match message.sender {
                Sender::User => "user-message",
                Sender::Assistant => "bot-message",
            };
            format!(
                "<div class=\"message {}\">{}</div>",
                class,
                message.content.to_html()
            )
        } else {
            let label = match message.sender {
                Sender::User => "Você",
                Sender::Assistant => "TrIAgem",
            };
            format!("{}:\n{}\n", label, message.plain_text())
        }
    }
}

impl<W: Write> MessageSink for PrintSink<W> {
    fn append(&mut self, message: Message) {
        let rendered = self.render(&message);
        if let Err(e) = writeln!(self.out, "{}", rendered) {
            tracing::warn!(error = %e, "could not write message");
        }
    }

    // Nothing to animate on a plain stream
    fn show_typing(&mut self) {}

    fn hide_typing(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use triagem_core::{ChatController, TriageApi, TriageError, TriageResponse};

    struct Canned(&'static str);

    #[async_trait]
    impl TriageApi for Canned {
        async fn triage(&self, _symptoms: &str) -> Result<TriageResponse, TriageError> {
            Ok(TriageResponse::classification_only(self.0))
        }
    }

    fn run(html: bool) -> String {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut controller = ChatController::new(
            PresetInput::new("  dor <forte>  "),
            NoButton,
            PrintSink::new(Vec::new(), html),
            Canned("Urgência ALTA"),
        );
        runtime.block_on(controller.submit());
        String::from_utf8(controller.messages().output().clone()).unwrap()
    }

    #[test]
    fn test_plain_output() {
        assert_eq!(
            run(false),
            "Você:\ndor <forte>\n\nTrIAgem:\nResultado da Triagem: Urgência ALTA\n\n"
        );
    }

    #[test]
    fn test_html_output_is_escaped() {
        let out = run(true);
        assert!(out.starts_with("<div class=\"message user-message\">dor &lt;forte&gt;</div>\n"));
        assert!(out.contains(
            "<div class=\"message bot-message\"><p><strong>Resultado da Triagem:</strong> Urgência ALTA</p></div>"
        ));
    }
}
