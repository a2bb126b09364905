//! Pure projection of widget state onto what a surface should display.
//!
//! Surfaces never look at the transcript or the widget directly; they only
//! apply the [`WidgetView`] produced here.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Bot,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Seeded welcome line, never part of the transcript.
    Greeting,
    /// A transcript turn.
    Turn,
    Offline,
    Error,
}

/// A message as shown in the list, whether or not it belongs to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub sender: Sender,
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub is_open: bool,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub sender: Sender,
    pub kind: MessageKind,
    pub text: String,
}

impl MessageView {
    pub fn css_class(&self) -> &'static str {
        match self.sender {
            Sender::Bot => "message bot-message",
            Sender::User => "message user-message",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub panel_active: bool,
    /// The floating toggle button is hidden while the panel is open.
    pub toggle_visible: bool,
    pub messages: Vec<MessageView>,
    /// Rendered after the last message while a request is in flight.
    pub typing_indicator: bool,
    pub accepts_input: bool,
}

pub fn project(state: &WidgetState, log: &[DisplayMessage]) -> WidgetView {
    WidgetView {
        panel_active: state.is_open,
        toggle_visible: !state.is_open,
        messages: log
            .iter()
            .map(|m| MessageView {
                sender: m.sender,
                kind: m.kind,
                text: m.text.clone(),
            })
            .collect(),
        typing_indicator: state.is_typing,
        accepts_input: !state.is_typing,
    }
}
