use crate::gemini_client::{CompletionClient, CompletionError, CompletionRequest};
use crate::managers::conversation::Transcript;
use crate::settings::ChatSettings;
use crate::view_model::{self, DisplayMessage, MessageKind, Sender, WidgetState, WidgetView};
use log::{debug, error, info, warn};
use std::time::Duration;

pub const WELCOME_MESSAGE: &str = "Hello! I'm the 100Solutionz AI Assistant. How can I help you today? I can tell you about our services in AI Chatbots, Model Training, and Digital Innovation.";
pub const OFFLINE_MESSAGE: &str = "I'm currently in 'UI mode' because the API key isn't set yet. Please set GEMINI_API_KEY to enable my AI brain!";
pub const OFFLINE_REPLY_DELAY: Duration = Duration::from_millis(1000);

pub fn failure_message(error: &CompletionError) -> String {
    format!(
        "Sorry, I'm having trouble connecting to my AI brain. Error: {}",
        error
    )
}

/// The host document the widget renders into.
pub trait WidgetSurface {
    fn mount(&mut self) {}
    fn render(&mut self, view: &WidgetView);
    fn clear_input(&mut self) {}
    fn focus_input(&mut self) {}
    fn unmount(&mut self) {}
}

/// Floating chat assistant: owns the transcript and allows one request in flight.
pub struct ChatWidget<C, S> {
    settings: ChatSettings,
    client: C,
    surface: S,
    state: WidgetState,
    transcript: Transcript,
    display: Vec<DisplayMessage>,
}

impl<C, S> ChatWidget<C, S>
where
    C: CompletionClient,
    S: WidgetSurface,
{
    /// Mounts the surface and shows the greeting. The greeting is never sent upstream.
    pub fn create(settings: ChatSettings, client: C, mut surface: S) -> Self {
        surface.mount();
        if settings.is_offline() {
            info!("Chat widget created in offline mode (no Gemini API key)");
        } else {
            info!("Chat widget created (model: {})", settings.model);
        }

        let mut widget = Self {
            settings,
            client,
            surface,
            state: WidgetState::default(),
            transcript: Transcript::new(),
            display: Vec::new(),
        };
        widget.show(Sender::Bot, MessageKind::Greeting, WELCOME_MESSAGE);
        widget
    }

    /// Unmounts the surface and hands back the conversation.
    pub fn dispose(mut self) -> Transcript {
        self.surface.unmount();
        info!(
            "Chat widget disposed after {} transcript turns",
            self.transcript.len()
        );
        self.transcript
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_typing
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn display_log(&self) -> &[DisplayMessage] {
        &self.display
    }

    pub fn view(&self) -> WidgetView {
        view_model::project(&self.state, &self.display)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// `Some(b)` sets the panel state, `None` flips it.
    pub fn open(&mut self, force: Option<bool>) {
        self.state.is_open = force.unwrap_or(!self.state.is_open);
        self.refresh();
        if self.state.is_open {
            self.surface.focus_input();
        }
    }

    /// Returns false when the message was ignored (blank, or a reply is pending).
    pub async fn submit_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.state.is_typing {
            return false;
        }

        self.surface.clear_input();
        self.transcript.add_user_message(text);
        self.show(Sender::User, MessageKind::Turn, text);

        self.request_response().await;
        true
    }

    /// Run one response cycle for the current transcript.
    pub async fn request_response(&mut self) {
        if self.transcript.is_empty() {
            warn!("Ignoring response request for an empty transcript");
            return;
        }

        if self.settings.is_offline() {
            tokio::time::sleep(OFFLINE_REPLY_DELAY).await;
            // Kept out of the transcript.
            self.show(Sender::Bot, MessageKind::Offline, OFFLINE_MESSAGE);
            return;
        }

        let request = self.begin_request();
        let result = self.client.generate(&request).await;
        self.complete_request(result);
    }

    /// Enter the pending state and build the payload for the endpoint.
    pub fn begin_request(&mut self) -> CompletionRequest {
        self.state.is_typing = true;
        self.refresh();
        debug!(
            "Requesting completion for {} transcript turns",
            self.transcript.len()
        );
        CompletionRequest::new(self.transcript.turns(), &self.settings.system_prompt)
    }

    /// Leave the pending state, recording the reply or showing the failure.
    pub fn complete_request(&mut self, result: Result<String, CompletionError>) {
        self.state.is_typing = false;
        match result {
            Ok(reply) => {
                self.transcript.add_model_message(reply.as_str());
                self.show(Sender::Bot, MessageKind::Turn, reply);
            }
            Err(e) => {
                error!("AI Error: {}", e);
                self.show(Sender::Bot, MessageKind::Error, failure_message(&e));
            }
        }
    }

    fn show(&mut self, sender: Sender, kind: MessageKind, text: impl Into<String>) {
        self.display.push(DisplayMessage {
            sender,
            kind,
            text: text.into(),
        });
        self.refresh();
    }

    fn refresh(&mut self) {
        let view = self.view();
        self.surface.render(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::conversation::Role;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn replying(replies: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn generate(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompletionError::MalformedPayload))
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        mounted: bool,
        views: Vec<WidgetView>,
        inputs_cleared: usize,
        focused: usize,
    }

    impl WidgetSurface for RecordingSurface {
        fn mount(&mut self) {
            self.mounted = true;
        }

        fn render(&mut self, view: &WidgetView) {
            self.views.push(view.clone());
        }

        fn clear_input(&mut self) {
            self.inputs_cleared += 1;
        }

        fn focus_input(&mut self) {
            self.focused += 1;
        }

        fn unmount(&mut self) {
            self.mounted = false;
        }
    }

    fn online_settings() -> ChatSettings {
        ChatSettings {
            api_key: "live-key".to_string(),
            ..ChatSettings::default()
        }
    }

    fn widget(
        settings: ChatSettings,
        replies: Vec<Result<String, CompletionError>>,
    ) -> ChatWidget<ScriptedClient, RecordingSurface> {
        ChatWidget::create(
            settings,
            ScriptedClient::replying(replies),
            RecordingSurface::default(),
        )
    }

    #[test]
    fn create_mounts_and_shows_greeting_outside_transcript() {
        let w = widget(online_settings(), vec![]);
        assert!(w.surface().mounted);
        assert_eq!(w.display_log().len(), 1);
        assert_eq!(w.display_log()[0].kind, MessageKind::Greeting);
        assert_eq!(w.display_log()[0].text, WELCOME_MESSAGE);
        assert!(w.transcript().is_empty());
        assert_eq!(w.state(), WidgetState::default());
    }

    #[test]
    fn toggling_twice_restores_state_and_force_sets_value() {
        let mut w = widget(online_settings(), vec![]);

        w.open(None);
        assert!(w.is_open());
        assert_eq!(w.surface().focused, 1);
        w.open(None);
        assert!(!w.is_open());

        w.open(Some(true));
        w.open(Some(true));
        assert!(w.is_open());
        w.open(Some(false));
        w.open(Some(false));
        assert!(!w.is_open());

        let last = w.surface().views.last().unwrap();
        assert!(!last.panel_active);
        assert!(last.toggle_visible);
    }

    #[tokio::test]
    async fn successful_reply_appends_model_turn() {
        let mut w = widget(online_settings(), vec![Ok("Hi there".to_string())]);

        assert!(w.submit_message("  Hello  ").await);

        let turns = w.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].role(), turns[0].text()), (Role::User, "Hello"));
        assert_eq!((turns[1].role(), turns[1].text()), (Role::Model, "Hi there"));
        assert!(!w.is_typing());
        assert_eq!(w.surface().inputs_cleared, 1);

        let last = w.surface().views.last().unwrap();
        assert!(!last.typing_indicator);
        assert_eq!(last.messages.last().unwrap().text, "Hi there");
        // Some view in between showed the indicator.
        assert!(w.surface().views.iter().any(|v| v.typing_indicator));
    }

    #[tokio::test]
    async fn user_turn_is_recorded_before_the_request_and_greeting_is_never_sent() {
        let mut w = widget(
            online_settings(),
            vec![Ok("One".to_string()), Ok("Two".to_string())],
        );
        w.submit_message("first").await;
        w.submit_message("second").await;

        let requests = w.client().requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.contents[0].role, Role::User);
            assert_eq!(request.contents.last().unwrap().role, Role::User);
            assert!(request
                .contents
                .iter()
                .all(|c| c.parts[0].text != WELCOME_MESSAGE));
            assert_eq!(
                request.system_instruction.parts[0].text,
                ChatSettings::default().system_prompt
            );
        }
        assert_eq!(requests[0].contents.len(), 1);
        assert_eq!(requests[1].contents.len(), 3);
        assert_eq!(requests[1].contents[2].parts[0].text, "second");
    }

    #[tokio::test]
    async fn upstream_error_is_shown_but_not_recorded() {
        let mut w = widget(
            online_settings(),
            vec![Err(CompletionError::Http {
                status: 429,
                message: "quota exceeded".to_string(),
            })],
        );

        w.submit_message("Hello").await;

        assert_eq!(w.transcript().len(), 1);
        assert!(!w.is_typing());
        let last = w.display_log().last().unwrap();
        assert_eq!(last.kind, MessageKind::Error);
        assert_eq!(last.sender, Sender::Bot);
        assert!(last.text.contains("quota exceeded"));
        assert!(!w.surface().views.last().unwrap().typing_indicator);
    }

    #[tokio::test]
    async fn malformed_payload_shows_invalid_response() {
        let mut w = widget(online_settings(), vec![Err(CompletionError::MalformedPayload)]);
        w.submit_message("Hello").await;

        assert_eq!(
            w.display_log().last().unwrap().text,
            "Sorry, I'm having trouble connecting to my AI brain. Error: Invalid response from AI"
        );
        assert_eq!(w.transcript().len(), 1);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut w = widget(online_settings(), vec![Ok("unused".to_string())]);

        assert!(!w.submit_message("").await);
        assert!(!w.submit_message("   \n\t").await);

        assert!(w.transcript().is_empty());
        assert!(w.client().requests().is_empty());
        assert_eq!(w.surface().inputs_cleared, 0);
    }

    #[tokio::test]
    async fn pending_request_blocks_submission() {
        let mut w = widget(online_settings(), vec![]);
        w.submit_message("first").await;
        let sent_before = w.client().requests().len();
        let turns_before = w.transcript().len();

        let _request = w.begin_request();
        assert!(w.is_typing());
        assert!(w.surface().views.last().unwrap().typing_indicator);

        assert!(!w.submit_message("second").await);
        assert_eq!(w.transcript().len(), turns_before);
        assert_eq!(w.client().requests().len(), sent_before);

        w.complete_request(Ok("done".to_string()));
        assert!(!w.is_typing());
        assert!(w.submit_message("third").await);
    }

    #[test]
    fn typing_flag_spans_exactly_the_pending_window() {
        let mut w = widget(online_settings(), vec![]);
        assert!(!w.is_typing());

        // Seed a user turn without going through the async path.
        w.transcript.add_user_message("Hello");
        let request = w.begin_request();
        assert!(w.is_typing());
        assert_eq!(request.contents.len(), 1);

        w.complete_request(Err(CompletionError::Transport("connection reset".to_string())));
        assert!(!w.is_typing());
        assert!(w
            .display_log()
            .last()
            .unwrap()
            .text
            .ends_with("Error: connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_mode_replies_after_delay_without_network() {
        let mut w = widget(ChatSettings::default(), vec![Ok("unused".to_string())]);
        let started = tokio::time::Instant::now();

        assert!(w.submit_message("Hello").await);

        assert!(started.elapsed() >= OFFLINE_REPLY_DELAY);
        assert!(w.client().requests().is_empty());
        assert_eq!(w.transcript().len(), 1);
        let offline: Vec<_> = w
            .display_log()
            .iter()
            .filter(|m| m.kind == MessageKind::Offline)
            .collect();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].text, OFFLINE_MESSAGE);
        assert!(w.surface().views.iter().all(|v| !v.typing_indicator));
    }

    #[tokio::test]
    async fn request_response_on_empty_transcript_does_nothing() {
        let mut w = widget(online_settings(), vec![Ok("unused".to_string())]);
        w.request_response().await;
        assert!(w.client().requests().is_empty());
        assert_eq!(w.display_log().len(), 1);
    }

    #[tokio::test]
    async fn dispose_unmounts_and_returns_transcript() {
        let mut w = widget(online_settings(), vec![Ok("Sure".to_string())]);
        w.submit_message("Can you help?").await;

        let transcript = w.dispose();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[1].text(), "Sure");
    }
}
