//! Assist Backend Abstraction
//!
//! Unified text-completion interface over multiple LLM providers (OpenAI,
//! Anthropic, local models via Ollama). The two assist flows built on top of
//! it, selector suggestion and change summaries, are fail-soft: callers
//! always receive displayable prose, never an error to branch on.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub mod selector;
pub mod summary;

pub use selector::SelectorAssistant;
pub use summary::ChangeSummarizer;

/// Displayable result when the configured provider has no API key. Not an
/// error: the caller shows it to the user as-is.
pub const API_KEY_MISSING: &str =
    "API Key missing. Add an api_key to the assist provider in vigil.toml.";

/// Assist provider configuration, resolved from `VigilConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssistProvider {
    OpenAI {
        model: String,
        api_key: Option<String>,
        base_url: Option<String>, // For custom OpenAI-compatible endpoints
    },
    Anthropic {
        model: String,
        api_key: Option<String>,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
}

/// Text-completion client: one prompt in, one response out.
#[async_trait]
pub trait AssistClient: Send + Sync {
    /// Send a single prompt and return the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, ApiError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

// Helper function to map HTTP transport errors to ApiError
fn map_http_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

// Helper function to map a non-success status + body to ApiError
fn map_status_error(status: reqwest::StatusCode, body: String) -> ApiError {
    match status.as_u16() {
        401 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", body)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", body)),
        404 => ApiError::ProviderModelNotFound(format!("Model not found: {}", body)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

const ASSIST_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ASSIST_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn build_assist_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(ASSIST_HTTP_CONNECT_TIMEOUT)
        .timeout(ASSIST_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

// OpenAI-compatible chat-completions request/response structures
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatRequestMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct ChatRequestMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatRequestMessage,
}

/// Client for OpenAI-compatible chat-completions endpoints (OpenAI itself,
/// Ollama's `/v1` surface, and custom local servers).
pub struct OpenAiCompatClient {
    client: Client,
    provider: &'static str,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiCompatClient {
    pub fn openai(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_assist_http_client()?,
            provider: "openai",
            model,
            api_key: Some(api_key),
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }

    pub fn ollama(model: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let base = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
        Ok(Self {
            client: build_assist_http_client()?,
            provider: "ollama",
            model,
            api_key: None,
            base_url: format!("{}/v1", base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl AssistClient for OpenAiCompatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatRequestMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(ref api_key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.json(&request).send().await.map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status_error(status, body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::ProviderError("No choices in response".to_string()))
    }

    fn provider_name(&self) -> &str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic messages-API client
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_assist_http_client()?,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl AssistClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, ApiError> {
        let request_body = json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status_error(status, body));
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            text: String,
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| ApiError::ProviderError("Empty content in response".to_string()))
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Stand-in client for a provider whose required API key is absent.
///
/// Resolves successfully with a fixed displayable message instead of
/// attempting the call, so missing credentials surface as ordinary prose.
pub struct UnconfiguredClient {
    provider: &'static str,
    model: String,
}

#[async_trait]
impl AssistClient for UnconfiguredClient {
    async fn complete(&self, _prompt: &str) -> Result<String, ApiError> {
        Ok(API_KEY_MISSING.to_string())
    }

    fn provider_name(&self) -> &str {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Factory for creating assist clients from provider configuration
pub struct AssistClientFactory;

impl AssistClientFactory {
    pub fn create_client(provider: &AssistProvider) -> Result<Box<dyn AssistClient>, ApiError> {
        match provider {
            AssistProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => match api_key {
                Some(key) => Ok(Box::new(OpenAiCompatClient::openai(
                    model.clone(),
                    key.clone(),
                    base_url.clone(),
                )?)),
                None => Ok(Box::new(UnconfiguredClient {
                    provider: "openai",
                    model: model.clone(),
                })),
            },
            AssistProvider::Anthropic { model, api_key } => match api_key {
                Some(key) => Ok(Box::new(AnthropicClient::new(model.clone(), key.clone())?)),
                None => Ok(Box::new(UnconfiguredClient {
                    provider: "anthropic",
                    model: model.clone(),
                })),
            },
            AssistProvider::Ollama { model, base_url } => Ok(Box::new(OpenAiCompatClient::ollama(
                model.clone(),
                base_url.clone(),
            )?)),
        }
    }
}
