use crate::email_client::{EmailClient, TemplateParams};
use log::error;

pub const SENDING_LABEL: &str = "Sending...";
pub const DEFAULT_SUBMIT_LABEL: &str = "Send Message";
pub const SENT_NOTICE: &str = "Your message has been sent successfully!";
pub const FAILED_NOTICE: &str = "Oops! Something went wrong. Please try again later.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Parse `name | email | subject | message`; the message may itself contain `|`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.splitn(4, '|').map(str::trim);
        let form = Self {
            name: fields.next()?.to_string(),
            email: fields.next()?.to_string(),
            subject: fields.next()?.to_string(),
            message: fields.next()?.to_string(),
        };
        Some(form)
    }

    pub fn template_params(&self) -> TemplateParams {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            label: DEFAULT_SUBMIT_LABEL.to_string(),
            disabled: false,
        }
    }
}

/// Send the form and return the notice to show the visitor.
///
/// The button reads "Sending..." and stays disabled while the email is in
/// flight, and is restored whatever the outcome.
pub async fn submit_contact_form(
    email: &EmailClient,
    form: &mut ContactForm,
    button: &mut SubmitButton,
) -> &'static str {
    let original_label = std::mem::replace(&mut button.label, SENDING_LABEL.to_string());
    button.disabled = true;

    let notice = match email.send(&form.template_params()).await {
        Ok(()) => {
            form.reset();
            SENT_NOTICE
        }
        Err(e) => {
            error!("Failed to send message: {}", e);
            FAILED_NOTICE
        }
    };

    button.label = original_label;
    button.disabled = false;
    notice
}
