use crate::chat_widget::WidgetSurface;
use crate::view_model::{MessageKind, MessageView, Sender, WidgetView};
use log::{debug, warn};
use std::io::Write;

const POPUP_TITLE: &str = "100Solutionz AI Assistant";
const POPUP_SUBTITLE: &str = "Powered by Gemini AI";

/// Renders the chat panel as lines on a terminal.
///
/// Messages only reach the terminal while the panel is open; anything that
/// arrived while it was closed is flushed the next time it opens.
pub struct TerminalSurface<W: Write> {
    out: W,
    printed: usize,
    panel_active: bool,
    typing_shown: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            panel_active: false,
            typing_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_view(&mut self, view: &WidgetView) -> std::io::Result<()> {
        if view.panel_active != self.panel_active {
            self.panel_active = view.panel_active;
            if view.panel_active {
                writeln!(self.out, "=== {} | {} ===", POPUP_TITLE, POPUP_SUBTITLE)?;
            } else {
                writeln!(self.out, "[chat closed, type /open to chat]")?;
                self.typing_shown = false;
            }
        }

        if !self.panel_active {
            return self.out.flush();
        }

        for message in view.messages.iter().skip(self.printed) {
            writeln!(self.out, "{}", format_message(message))?;
        }
        self.printed = view.messages.len();

        if view.typing_indicator && !self.typing_shown {
            writeln!(self.out, "Assistant is typing...")?;
        }
        self.typing_shown = view.typing_indicator;

        self.out.flush()
    }
}

fn format_message(message: &MessageView) -> String {
    match (message.sender, message.kind) {
        (Sender::User, _) => format!("You: {}", message.text),
        (Sender::Bot, MessageKind::Error) => format!("Assistant (!): {}", message.text),
        (Sender::Bot, _) => format!("Assistant: {}", message.text),
    }
}

impl<W: Write> WidgetSurface for TerminalSurface<W> {
    fn mount(&mut self) {
        debug!("Terminal chat surface mounted");
    }

    fn render(&mut self, view: &WidgetView) {
        if let Err(e) = self.write_view(view) {
            warn!("Failed to render chat panel: {}", e);
        }
    }

    fn unmount(&mut self) {
        if let Err(e) = writeln!(self.out, "Goodbye!").and_then(|_| self.out.flush()) {
            warn!("Failed to close chat panel: {}", e);
        }
    }
}
