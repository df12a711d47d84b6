//! Generative-text providers.
//!
//! One [`ContentGenerator`] implementation, [`HttpGenerator`], speaks to every
//! supported provider over HTTP. The provider name stays an opaque string
//! until `generate` is called, so an unsupported provider only fails the
//! generation step and never startup.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Config, DEFAULT_LOCATION};
use crate::error::ProviderError;

pub const MAX_TOKENS: u32 = 1000;
pub const TEMPERATURE: f32 = 0.7;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Supported generative-text providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Claude,
    OpenAi,
    Google,
    VertexAi,
    Groq,
    HuggingFace,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::VertexAi => "vertex-ai",
            Provider::Groq => "groq",
            Provider::HuggingFace => "huggingface",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::OpenAi => "OpenAI",
            Provider::Google => "Google Generative AI",
            Provider::VertexAi => "Vertex AI",
            Provider::Groq => "Groq",
            Provider::HuggingFace => "Hugging Face",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Claude => "claude-3-5-sonnet-20241022",
            Provider::OpenAi => "gpt-4o",
            Provider::Google => "gemini-1.5-flash",
            Provider::VertexAi => "gemini-1.5-pro",
            Provider::Groq => "llama-3.1-70b-versatile",
            Provider::HuggingFace => "microsoft/DialoGPT-medium",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Google => "GOOGLE_API_KEY",
            Provider::VertexAi => "VERTEX_AI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::HuggingFace => "HUGGINGFACE_API_KEY",
        }
    }

    fn default_base_url(&self, location: &str) -> String {
        match self {
            Provider::Claude => "https://api.anthropic.com".to_string(),
            Provider::OpenAi => "https://api.openai.com".to_string(),
            Provider::Google => "https://generativelanguage.googleapis.com".to_string(),
            Provider::VertexAi => format!("https://{}-aiplatform.googleapis.com", location),
            Provider::Groq => "https://api.groq.com/openai".to_string(),
            Provider::HuggingFace => "https://api-inference.huggingface.co".to_string(),
        }
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" => Ok(Provider::Claude),
            "openai" => Ok(Provider::OpenAi),
            "google" => Ok(Provider::Google),
            "vertex-ai" => Ok(Provider::VertexAi),
            "groq" => Ok(Provider::Groq),
            "huggingface" => Ok(Provider::HuggingFace),
            _ => Err(ProviderError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns a system instruction and a user instruction into generated text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, ProviderError>;
}

/// [`ContentGenerator`] backed by each provider's HTTP API.
pub struct HttpGenerator {
    client: reqwest::Client,
    provider: String,
    model: String,
    api_key: String,
    base_url: Option<String>,
    project_id: Option<String>,
    location: String,
    timeout: Option<Duration>,
}

impl HttpGenerator {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            provider: provider.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: None,
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            timeout: None,
        })
    }

    /// Build a generator from configuration with the given credential.
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self, ProviderError> {
        let generator = Self::new(&config.provider, &config.model, api_key)?
            .with_vertex(config.project_id.clone(), config.location.clone());

        Ok(match config.request_timeout {
            Some(timeout) => generator.with_timeout(timeout),
            None => generator,
        })
    }

    /// Override the provider's API root (used against mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_vertex(mut self, project_id: Option<String>, location: String) -> Self {
        self.project_id = project_id;
        self.location = location;
        self
    }

    /// Bound a single generation call. Without one the client's own
    /// behavior applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self, provider: Provider) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url(&self.location))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        provider: Provider,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let label = provider.label();
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        let resp = request
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: label,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                provider: label,
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>().await.map_err(|source| ProviderError::Http {
            provider: label,
            source,
        })
    }

    async fn generate_claude(&self, system: &str, user: &str) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url(Provider::Claude));
        let body = ClaudeRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![ChatMessage {
                role: "user",
                content: user,
            }],
        };

        let resp: ClaudeResponse = self
            .send(
                Provider::Claude,
                self.client
                    .post(url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body),
            )
            .await?;

        Ok(resp.content.into_iter().find_map(|c| c.text))
    }

    /// OpenAI and Groq share the chat-completions request shape.
    async fn generate_chat(
        &self,
        provider: Provider,
        system: &str,
        user: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url(provider));
        let body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let resp: ChatResponse = self
            .send(
                provider,
                self.client.post(url).bearer_auth(&self.api_key).json(&body),
            )
            .await?;

        Ok(resp.choices.into_iter().next().and_then(|c| c.message.content))
    }

    async fn generate_google(&self, system: &str, user: &str) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url(Provider::Google),
            self.model
        );
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system }, GeminiPart { text: user }],
            }],
            generation_config: None,
        };

        let resp: GeminiResponse = self
            .send(
                Provider::Google,
                self.client
                    .post(url)
                    .query(&[("key", self.api_key.as_str())])
                    .json(&body),
            )
            .await?;

        Ok(resp.first_text())
    }

    async fn generate_vertex(&self, system: &str, user: &str) -> Result<Option<String>, ProviderError> {
        let project_id = self
            .project_id
            .as_deref()
            .ok_or(ProviderError::MissingProjectId)?;

        let url = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url(Provider::VertexAi),
            project_id,
            self.location,
            self.model
        );
        let text = format!("{}\n\n{}", system, user);
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: &text }],
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
            }),
        };

        let resp: GeminiResponse = self
            .send(
                Provider::VertexAi,
                self.client.post(url).bearer_auth(&self.api_key).json(&body),
            )
            .await?;

        Ok(resp.first_text())
    }

    async fn generate_huggingface(
        &self,
        system: &str,
        user: &str,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/models/{}", self.base_url(Provider::HuggingFace), self.model);
        let inputs = format!("{}\n\nUser: {}", system, user);
        let body = HuggingFaceRequest {
            inputs: &inputs,
            parameters: HuggingFaceParameters {
                max_length: MAX_TOKENS,
            },
        };

        let resp: serde_json::Value = self
            .send(
                Provider::HuggingFace,
                self.client.post(url).bearer_auth(&self.api_key).json(&body),
            )
            .await?;

        // The inference API answers with either a list of generations or a single object.
        let text = resp
            .get(0)
            .and_then(|first| first.get("generated_text"))
            .or_else(|| resp.get("generated_text"))
            .and_then(|t| t.as_str())
            .map(str::to_string);

        Ok(text)
    }
}

#[async_trait]
impl ContentGenerator for HttpGenerator {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let provider: Provider = self.provider.parse()?;
        info!("Using {} with model {}", provider, self.model);

        let text = match provider {
            Provider::Claude => self.generate_claude(system_prompt, user_prompt).await?,
            Provider::OpenAi | Provider::Groq => {
                self.generate_chat(provider, system_prompt, user_prompt).await?
            }
            Provider::Google => self.generate_google(system_prompt, user_prompt).await?,
            Provider::VertexAi => self.generate_vertex(system_prompt, user_prompt).await?,
            Provider::HuggingFace => self.generate_huggingface(system_prompt, user_prompt).await?,
        };

        match text {
            Some(t) if !t.trim().is_empty() => Ok(t),
            _ => Err(ProviderError::EmptyResponse(provider.label())),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
    }
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct HuggingFaceRequest<'a> {
    inputs: &'a str,
    parameters: HuggingFaceParameters,
}

#[derive(Serialize)]
struct HuggingFaceParameters {
    max_length: u32,
}
