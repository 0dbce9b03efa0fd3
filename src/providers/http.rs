//! HTTP chat backends.
//!
//! Two request shapes cover every roster binding: the OpenAI-compatible
//! `/chat/completions` endpoint (OpenAI, xAI, DeepSeek, OpenRouter) and
//! Anthropic's `/v1/messages`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::retry::RateLimitBackoff;
use super::scripted::ScriptedGenerator;
use super::{BoxFuture, Generation, GenerationRequest, Generator};
use crate::config::{BackendConfig, ProviderKind, SeasonConfig};
use crate::error::{Result, SeasonError};
use crate::levels::GenerationConfig;
use crate::participant::ParticipantId;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Outcome of a single chat call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResult {
    /// Response text and reported token usage
    Success {
        /// Response text
        content: String,
        /// Tokens reported by the API
        tokens: u32,
    },
    /// HTTP 429
    RateLimited,
    /// Anything else
    Error(String),
}

/// Chat API client with rate-limit retries
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    backoff: RateLimitBackoff,
}

impl ChatClient {
    /// Create a client whose rate-limit waits fit inside `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SeasonError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            backoff: RateLimitBackoff::within(timeout),
        })
    }

    /// Send one user message, retrying on rate limits
    pub async fn complete(
        &self,
        backend: &BackendConfig,
        prompt: &str,
        config: GenerationConfig,
    ) -> ApiResult {
        let mut retry = 0;
        let mut waited = Duration::ZERO;
        loop {
            let result = match backend.provider {
                ProviderKind::OpenaiCompatible => self.openai(backend, prompt, config).await,
                ProviderKind::Anthropic => self.anthropic(backend, prompt, config).await,
                ProviderKind::Scripted => {
                    return ApiResult::Error("scripted backend has no HTTP endpoint".into())
                },
            };
            if result != ApiResult::RateLimited {
                return result;
            }
            let Some(wait) = self.backoff.next_wait(retry, waited) else {
                return result;
            };
            warn!(model = %backend.model, retry, ?wait, "Rate limited, backing off");
            tokio::time::sleep(wait).await;
            waited += wait;
            retry += 1;
        }
    }

    async fn openai(
        &self,
        backend: &BackendConfig,
        prompt: &str,
        config: GenerationConfig,
    ) -> ApiResult {
        let Some(api_key) = backend.api_key() else {
            return ApiResult::Error(format!("{} not set", backend.api_key_env));
        };
        let request = ChatRequest {
            model: &backend.model,
            messages: vec![Message::user(prompt)],
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
        };
        let url = format!("{}/chat/completions", backend.base_url.trim_end_matches('/'));

        let response = match self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ApiResult::Error(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return ApiResult::RateLimited;
            }
            let error_text = response.text().await.unwrap_or_default();
            return ApiResult::Error(format!("API error {status}: {error_text}"));
        }

        match response.json::<ChatResponse>().await {
            Ok(result) => {
                let content = result
                    .choices
                    .first()
                    .map(|c| c.message.content.clone())
                    .unwrap_or_default();
                let tokens = result.usage.map_or(0, |u| u.total_tokens);
                ApiResult::Success { content, tokens }
            },
            Err(e) => ApiResult::Error(format!("JSON parse error: {e}")),
        }
    }

    async fn anthropic(
        &self,
        backend: &BackendConfig,
        prompt: &str,
        config: GenerationConfig,
    ) -> ApiResult {
        let Some(api_key) = backend.api_key() else {
            return ApiResult::Error(format!("{} not set", backend.api_key_env));
        };
        // The messages API caps temperature at 1.0.
        let request = ChatRequest {
            model: &backend.model,
            messages: vec![Message::user(prompt)],
            temperature: Some(config.temperature.clamp(0.0, 1.0)),
            max_tokens: Some(config.max_tokens),
        };
        let url = format!("{}/v1/messages", backend.base_url.trim_end_matches('/'));

        let response = match self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ApiResult::Error(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return ApiResult::RateLimited;
            }
            let error_text = response.text().await.unwrap_or_default();
            return ApiResult::Error(format!("API error {status}: {error_text}"));
        }

        match response.json::<MessagesResponse>().await {
            Ok(result) => {
                let content = result
                    .content
                    .into_iter()
                    .filter_map(|b| b.text)
                    .collect::<Vec<_>>()
                    .join("");
                let tokens = result
                    .usage
                    .map_or(0, |u| u.input_tokens + u.output_tokens);
                ApiResult::Success { content, tokens }
            },
            Err(e) => ApiResult::Error(format!("JSON parse error: {e}")),
        }
    }
}

/// Routes each participant to its configured backend.
///
/// Participants bound to the `scripted` provider are answered in-process.
pub struct HttpGenerator {
    chat: ChatClient,
    backends: HashMap<ParticipantId, BackendConfig>,
    scripted: Arc<ScriptedGenerator>,
}

impl HttpGenerator {
    /// Build from the roster bindings of a season config
    pub fn from_config(config: &SeasonConfig) -> Result<Self> {
        let chat = ChatClient::new(config.call_timeout())?;
        let backends = config
            .participants
            .iter()
            .map(|p| (ParticipantId::new(p.name.as_str()), p.backend.clone()))
            .collect();
        let names = config.participants.iter().map(|p| p.name.clone()).collect();
        Ok(Self {
            chat,
            backends,
            scripted: Arc::new(ScriptedGenerator::new(names)),
        })
    }
}

impl Generator for HttpGenerator {
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Generation> {
        Box::pin(async move {
            let Some(backend) = self.backends.get(&request.participant) else {
                return Generation::failed(format!("no backend for {}", request.participant));
            };
            if backend.provider == ProviderKind::Scripted {
                return self.scripted.generate(request).await;
            }
            debug!(participant = %request.participant, model = %backend.model, "Calling backend");
            match self
                .chat
                .complete(backend, &request.prompt, request.config)
                .await
            {
                ApiResult::Success { content, tokens } if !content.trim().is_empty() => {
                    Generation::ok(content, tokens)
                },
                ApiResult::Success { .. } => Generation::failed("empty response"),
                ApiResult::RateLimited => Generation::failed("rate limited"),
                ApiResult::Error(e) => {
                    warn!(participant = %request.participant, error = %e, "Generation failed");
                    Generation::failed(e)
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_failed_generation() {
        let mut config = SeasonConfig::default();
        config.participants.truncate(1);
        config.participants[0].backend.api_key_env = "ELIMINATION_TEST_KEY_THAT_IS_NOT_SET".into();
        let generator = HttpGenerator::from_config(&config).unwrap();

        let result = generator
            .generate(GenerationRequest {
                participant: ParticipantId::new("Grok"),
                prompt: "hi".into(),
                config: GenerationConfig {
                    max_tokens: 10,
                    temperature: 0.7,
                },
            })
            .await;
        assert!(!result.succeeded);
        assert!(result.text.contains("ELIMINATION_TEST_KEY_THAT_IS_NOT_SET"));
    }

    #[tokio::test]
    async fn test_unknown_participant_is_failed_generation() {
        let generator = HttpGenerator::from_config(&SeasonConfig::default()).unwrap();
        let result = generator
            .generate(GenerationRequest {
                participant: ParticipantId::new("Gemini"),
                prompt: "hi".into(),
                config: GenerationConfig {
                    max_tokens: 10,
                    temperature: 0.7,
                },
            })
            .await;
        assert!(!result.succeeded);
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: vec![Message::user("hello")],
            temperature: Some(0.5),
            max_tokens: Some(100),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 100);
    }
}
