use std::time::Duration;

use anyhow::Result;
use reqwest::{Client as HttpClient, StatusCode};
use rig::agent::AgentBuilder;
use rig::completion::{
    AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    Message as RigMessage,
};
use rig::message::{Text, UserContent};
use rig::OneOrMany;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

// Groq hosted models
pub const LLAMA3_70B: &str = "llama3-70b-8192";
pub const LLAMA3_8B: &str = "llama3-8b-8192";

const API_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Client for an OpenAI-compatible chat completion endpoint. Groq by default,
/// but any service speaking the same wire format works through `with_base_url`.
#[derive(Clone)]
pub struct Client {
    pub base_url: String,
    api_key: String,
    http_client: HttpClient,
}

impl Client {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: API_URL.to_string(),
            api_key: api_key.to_string(),
            http_client: HttpClient::builder().timeout(timeout).build()?,
        })
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| anyhow::anyhow!("GROQ_API_KEY must be set"))?;
        Ok(Self::new(&api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))?)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn completion_model(&self, model_name: &str) -> GroqCompletionModel {
        GroqCompletionModel {
            client: self.clone(),
            model: model_name.to_string(),
        }
    }

    pub fn agent(&self, model_name: &str) -> AgentBuilder<GroqCompletionModel> {
        AgentBuilder::new(self.completion_model(model_name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: "system".to_string(), content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: content.to_string() }
    }

    pub fn assistant(content: &str) -> Self {
        Self { role: "assistant".to_string(), content: content.to_string() }
    }
}

impl From<&RigMessage> for ChatMessage {
    fn from(message: &RigMessage) -> Self {
        match message {
            RigMessage::User { content } => {
                let text = content.iter()
                    .filter_map(|c| match c {
                        UserContent::Text(text) => Some(text.text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                ChatMessage::user(&text)
            }
            RigMessage::Assistant { content } => {
                let text = content.iter()
                    .filter_map(|c| match c {
                        AssistantContent::Text(text) => Some(text.text.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                ChatMessage::assistant(&text)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl TryFrom<ChatResponse> for CompletionResponse<ChatResponse> {
    type Error = ProviderError;

    fn try_from(value: ChatResponse) -> Result<Self, Self::Error> {
        let content = value.choices.first()
            .ok_or_else(|| ProviderError::ParseError("No completion choices returned".into()))?
            .message
            .content
            .clone()
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(CompletionResponse {
            choice: OneOrMany::one(AssistantContent::Text(Text { text: content })),
            raw_response: value,
        })
    }
}

/// `rig` completion model backed by the chat completions endpoint.
#[derive(Clone)]
pub struct GroqCompletionModel {
    pub client: Client,
    pub model: String,
}

impl GroqCompletionModel {
    fn create_request_body(&self, request: &CompletionRequest) -> ChatRequest<'_> {
        let mut messages = Vec::with_capacity(request.chat_history.len() + 2);
        if let Some(preamble) = &request.preamble {
            messages.push(ChatMessage::system(preamble));
        }
        messages.extend(request.chat_history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::from(&request.prompt));

        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        }
    }

    async fn send(&self, request: &CompletionRequest) -> Result<CompletionResponse<ChatResponse>, ProviderError> {
        let body = self.create_request_body(request);
        let url = format!("{}/chat/completions", self.client.base_url);
        debug!(model = %self.model, messages = body.messages.len(), "sending completion request");

        let resp = self.client
            .http_client
            .post(url)
            .bearer_auth(&self.client.api_key)
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::Unauthorized(text));
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimit),
            status => {
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::Api { status: status.as_u16(), body: text });
            }
        }

        let text = resp.text().await?;
        let response: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        response.try_into()
    }
}

impl CompletionModel for GroqCompletionModel {
    type Response = ChatResponse;

    async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse<ChatResponse>, CompletionError> {
        Ok(self.send(&request).await?)
    }
}
