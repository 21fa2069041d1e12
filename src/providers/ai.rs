/// Suggestion backends: OpenRouter, Ollama and Gemini
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ProviderSettings;

const REMOTE_TIMEOUT_SECS: u64 = 60;
const OLLAMA_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const OPENROUTER_MAX_ATTEMPTS: u32 = 3;
const ERROR_BODY_CHARS: usize = 200;

/// Supported suggestion backends, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIProvider {
    OpenRouter,
    Ollama,
    Gemini,
}

impl std::fmt::Display for AIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AIProvider::OpenRouter => "OpenRouter",
            AIProvider::Ollama => "Ollama",
            AIProvider::Gemini => "Gemini",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} {status}: {message}")]
    Api {
        provider: AIProvider,
        status: u16,
        message: String,
    },

    #[error("{provider} rate limited after {attempts} retries")]
    RateLimited { provider: AIProvider, attempts: u32 },

    #[error("{provider} returned no content")]
    EmptyResponse { provider: AIProvider },
}

/// A service that turns a review prompt into free-form suggestion text
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

fn http_client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .map_err(ProviderError::Client)
}

/// `error.message` from a JSON error body, else the first 200 characters of the body
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(ERROR_BODY_CHARS).collect(),
    }
}

/// OpenRouter chat completions with linear backoff on HTTP 429
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    backoff_step: Duration,
}

impl OpenRouterProvider {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(REMOTE_TIMEOUT_SECS)?,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            backoff_step: Duration::from_secs(10),
        })
    }

    /// Wait `step * attempt` after the n-th rate-limited attempt
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }
}

#[async_trait]
impl SuggestionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        for attempt in 1..=OPENROUTER_MAX_ATTEMPTS {
            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = self.backoff_step * attempt;
                warn!("OpenRouter rate limited. Waiting {:?}...", wait);
                tokio::time::sleep(wait).await;
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::Api {
                    provider: AIProvider::OpenRouter,
                    status: status.as_u16(),
                    message: api_error_message(&body),
                });
            }

            let parsed: ChatResponse = response.json().await?;
            return parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or(ProviderError::EmptyResponse {
                    provider: AIProvider::OpenRouter,
                });
        }

        Err(ProviderError::RateLimited {
            provider: AIProvider::OpenRouter,
            attempts: OPENROUTER_MAX_ATTEMPTS,
        })
    }
}

/// Local Ollama server, non-streaming generate endpoint
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(OLLAMA_TIMEOUT_SECS)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl SuggestionProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false
            }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.response)
    }
}

/// Google Gemini generateContent
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(REMOTE_TIMEOUT_SECS)?,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SuggestionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct GoogleResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: ContentPart,
        }

        #[derive(Deserialize)]
        struct ContentPart {
            #[serde(default)]
            parts: Vec<Part>,
        }

        #[derive(Deserialize)]
        struct Part {
            #[serde(default)]
            text: Option<String>,
        }

        let request_body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: AIProvider::Gemini,
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: GoogleResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(ProviderError::EmptyResponse {
                provider: AIProvider::Gemini,
            })
    }
}

/// Build the backend chain: OpenRouter when keyed, Ollama always, Gemini when keyed
pub fn providers_from_settings(
    settings: &ProviderSettings,
) -> Result<Vec<Box<dyn SuggestionProvider>>, ProviderError> {
    let mut providers: Vec<Box<dyn SuggestionProvider>> = Vec::new();

    if let Some(key) = &settings.openrouter_api_key {
        providers.push(Box::new(OpenRouterProvider::new(
            key,
            &settings.openrouter_model,
            &settings.openrouter_base_url,
        )?));
    }

    providers.push(Box::new(OllamaProvider::new(
        &settings.ollama_url,
        &settings.ollama_model,
    )?));

    if let Some(key) = &settings.gemini_api_key {
        providers.push(Box::new(GeminiProvider::new(
            key,
            &settings.gemini_model,
            &settings.gemini_base_url,
        )?));
    }

    info!(
        "suggestion backends: {}",
        providers.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
    );
    Ok(providers)
}
