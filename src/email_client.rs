use crate::settings::EmailSettings;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

pub type TemplateParams = BTreeMap<String, String>;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

/// Sends EmailJS templates through the REST endpoint.
pub struct EmailClient {
    client: reqwest::Client,
    settings: EmailSettings,
}

impl EmailClient {
    pub fn new(settings: EmailSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.public_key.is_some()
            && self.settings.service_id.is_some()
            && self.settings.template_id.is_some()
    }

    pub async fn send(&self, template_params: &TemplateParams) -> Result<(), String> {
        let (Some(public_key), Some(service_id), Some(template_id)) = (
            self.settings.public_key.as_deref(),
            self.settings.service_id.as_deref(),
            self.settings.template_id.as_deref(),
        ) else {
            return Err("EmailJS is not configured".to_string());
        };

        let body = SendRequest {
            service_id,
            template_id,
            user_id: public_key,
            template_params,
        };

        debug!(
            "Sending EmailJS template {} with {} params",
            template_id,
            template_params.len()
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(format!(
                "EmailJS request failed with status {}: {}",
                status, error_text
            ));
        }

        Ok(())
    }
}
