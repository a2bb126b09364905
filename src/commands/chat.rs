use crate::chat_widget::{ChatWidget, WidgetSurface};
use crate::contact_form::{self, ContactForm, SubmitButton};
use crate::email_client::EmailClient;
use crate::gemini_client::CompletionClient;
use log::debug;
use std::io::Write;
use std::ops::ControlFlow;

pub const CONTACT_USAGE: &str = "Usage: /contact name | email | subject | message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Open,
    Close,
    Toggle,
    Contact(ContactForm),
    ContactUsage,
    Quit,
    Unknown(String),
    Message(String),
}

pub fn parse_host_command(line: &str) -> HostCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return HostCommand::Message(line.to_string());
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match name {
        "open" => HostCommand::Open,
        "close" => HostCommand::Close,
        "toggle" => HostCommand::Toggle,
        "quit" | "exit" => HostCommand::Quit,
        "contact" => ContactForm::parse(args)
            .map(HostCommand::Contact)
            .unwrap_or(HostCommand::ContactUsage),
        other => HostCommand::Unknown(other.to_string()),
    }
}

/// Apply one host command. `Break` means the host should shut down.
pub async fn dispatch<C, S, W>(
    command: HostCommand,
    widget: &mut ChatWidget<C, S>,
    email: &EmailClient,
    button: &mut SubmitButton,
    notices: &mut W,
) -> std::io::Result<ControlFlow<()>>
where
    C: CompletionClient,
    S: WidgetSurface,
    W: Write,
{
    debug!("Dispatching host command {:?}", command);

    match command {
        HostCommand::Open => widget.open(Some(true)),
        HostCommand::Close => widget.open(Some(false)),
        HostCommand::Toggle => widget.open(None),
        HostCommand::Quit => return Ok(ControlFlow::Break(())),
        HostCommand::Contact(mut form) => {
            let notice = contact_form::submit_contact_form(email, &mut form, button).await;
            writeln!(notices, "{}", notice)?;
        }
        HostCommand::ContactUsage => writeln!(notices, "{}", CONTACT_USAGE)?,
        HostCommand::Unknown(name) => writeln!(notices, "Unknown command: /{}", name)?,
        HostCommand::Message(text) => {
            if !widget.is_open() {
                if !text.trim().is_empty() {
                    writeln!(notices, "The chat is closed. Type /open to start chatting.")?;
                }
            } else {
                widget.submit_message(&text).await;
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}
