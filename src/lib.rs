pub mod chat_popup;
pub mod chat_widget;
pub mod commands;
pub mod contact_form;
pub mod email_client;
pub mod gemini_client;
pub mod managers;
pub mod settings;
pub mod utils;
pub mod view_model;
pub mod visitor_beacon;

#[cfg(test)]
mod test_support;

use chat_popup::TerminalSurface;
use chat_widget::ChatWidget;
use commands::chat::{dispatch, parse_host_command};
use contact_form::SubmitButton;
use email_client::EmailClient;
use gemini_client::GeminiClient;
use log::{debug, info};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use utils::GeoLocator;
use visitor_beacon::{track_visitor, SessionStore};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path reported by the visitor beacon.
    pub page_path: String,
    pub track_visitor: bool,
    pub open_on_start: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            page_path: "/".to_string(),
            track_visitor: true,
            open_on_start: false,
        }
    }
}

/// Host the widgets on the terminal until stdin closes or `/quit` is entered.
pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let settings = settings::get_settings();
    let email = Arc::new(EmailClient::new(settings.email.clone()));

    if options.track_visitor && email.is_configured() {
        let geo = GeoLocator::new(settings.geo_endpoint.clone());
        let email = email.clone();
        let page_path = options.page_path.clone();
        tokio::spawn(async move {
            let mut session = SessionStore::new();
            let outcome = track_visitor(&mut session, &geo, &email, &page_path).await;
            debug!("Visitor beacon finished: {:?}", outcome);
        });
    } else {
        debug!("Visitor beacon disabled or EmailJS not configured");
    }

    let client = GeminiClient::new(&settings.chat);
    let surface = TerminalSurface::new(std::io::stdout());
    let mut widget = ChatWidget::create(settings.chat, client, surface);
    if options.open_on_start {
        widget.open(Some(true));
    } else {
        println!("Chat assistant ready. Type /open to start chatting, /quit to exit.");
    }

    let mut button = SubmitButton::default();
    let mut notices = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = parse_host_command(&line);
        if let ControlFlow::Break(()) =
            dispatch(command, &mut widget, &email, &mut button, &mut notices).await?
        {
            break;
        }
    }

    let transcript = widget.dispose();
    info!("Session ended with {} transcript turns", transcript.len());
    Ok(())
}
