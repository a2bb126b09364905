use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const GEMINI_API_KEY_PLACEHOLDER: &str = "YOUR_GEMINI_API_KEY_HERE";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_ENDPOINT_TEMPLATE: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent?key={key}";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are the 100Solutionz AI Assistant. You are professional, helpful, and knowledgeable about 100Solutionz services: AI Chatbots, AI Model Training, and Digital Marketing/Innovation. 100Solutionz helps brands future-proof their business. Keep responses concise and friendly.";

pub const DEFAULT_EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_GEO_ENDPOINT: &str = "https://freeipapi.com/api/json";

/// Settings for the chat assistant. Read-only once the widget is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSettings {
    pub api_key: String,
    pub model: String,
    pub endpoint_template: String,
    pub system_prompt: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_key: GEMINI_API_KEY_PLACEHOLDER.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatSettings {
    /// True when no usable key is configured and the widget must stay in offline mode.
    pub fn is_offline(&self) -> bool {
        let key = self.api_key.trim();
        key.is_empty() || key == GEMINI_API_KEY_PLACEHOLDER
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmailSettings {
    pub endpoint: String,
    pub public_key: Option<String>,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    pub chat: ChatSettings,
    pub email: EmailSettings,
    pub geo_endpoint: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            chat: ChatSettings::default(),
            email: EmailSettings {
                endpoint: DEFAULT_EMAILJS_ENDPOINT.to_string(),
                ..Default::default()
            },
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
        }
    }
}

// Priority: environment variables (optionally from .env) > defaults.
pub fn get_settings() -> AppSettings {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found, using process environment"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    settings_from(|name| std::env::var(name).ok())
}

/// Build settings from an arbitrary variable lookup. Blank values count as unset.
pub fn settings_from<F>(lookup: F) -> AppSettings
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let defaults = AppSettings::default();

    AppSettings {
        chat: ChatSettings {
            api_key: var("GEMINI_API_KEY").unwrap_or(defaults.chat.api_key),
            model: var("GEMINI_MODEL").unwrap_or(defaults.chat.model),
            endpoint_template: var("GEMINI_ENDPOINT_TEMPLATE")
                .unwrap_or(defaults.chat.endpoint_template),
            system_prompt: var("ASSISTANT_SYSTEM_PROMPT").unwrap_or(defaults.chat.system_prompt),
        },
        email: EmailSettings {
            endpoint: var("EMAILJS_ENDPOINT").unwrap_or(defaults.email.endpoint),
            public_key: var("EMAILJS_PUBLIC_KEY"),
            service_id: var("EMAILJS_SERVICE_ID"),
            template_id: var("EMAILJS_TEMPLATE_ID"),
        },
        geo_endpoint: var("VISITOR_GEO_ENDPOINT").unwrap_or(defaults.geo_endpoint),
    }
}
