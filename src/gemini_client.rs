use crate::managers::conversation::{ConversationTurn, Role};
use crate::settings::ChatSettings;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeminiContent {
    pub role: Role,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<GeminiPart>,
}

/// Body of a `generateContent` call: the transcript plus the fixed system prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub contents: Vec<GeminiContent>,
    pub system_instruction: SystemInstruction,
}

impl CompletionRequest {
    pub fn new(turns: &[ConversationTurn], system_prompt: &str) -> Self {
        let contents = turns
            .iter()
            .map(|turn| GeminiContent {
                role: turn.role(),
                parts: vec![GeminiPart {
                    text: turn.text().to_string(),
                }],
            })
            .collect();

        Self {
            contents,
            system_instruction: SystemInstruction {
                parts: vec![GeminiPart {
                    text: system_prompt.to_string(),
                }],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Why a single completion request failed. Every variant is terminal for that request only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Invalid response from AI")]
    MalformedPayload,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Extract the reply at `candidates[0].content.parts[0].text`.
pub fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|_| CompletionError::MalformedPayload)?;

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|text| !text.is_empty())
        .ok_or(CompletionError::MalformedPayload)
}

/// Classify a non-2xx response, preferring the upstream `error.message`.
pub fn http_error(status: u16, body: &str) -> CompletionError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status));

    CompletionError::Http { status, message }
}

pub fn endpoint_url(settings: &ChatSettings) -> String {
    let key: String = url::form_urlencoded::byte_serialize(settings.api_key.as_bytes()).collect();
    settings
        .endpoint_template
        .replace("{model}", &settings.model)
        .replace("{key}", &key)
}

pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &ChatSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint_url(settings),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // The key rides in the query string, so the URL is never logged.
        debug!(
            "Sending request to Gemini model {} with {} turns",
            self.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(http_error(status.as_u16(), &body));
        }

        parse_reply(&body)
    }
}
