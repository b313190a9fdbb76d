//! Chat-completion client for C code generation and repair.

use crate::extract::extract_code;
use crate::prompts;
use async_trait::async_trait;
use flux_core::{CodeGenerator, FluxError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Responses shorter than this after extraction are rejected as invalid
/// rather than silently accepted.
const MIN_CODE_LEN: usize = 10;

const PLACEHOLDER_KEYS: &[&str] = &["", "your_codegen_api_key_here", "changeme"];

/// Code-generation service configuration, read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodegenConfig {
    /// Bearer token for the service.
    pub api_key: String,

    /// Base URL (no trailing slash).
    pub api_url: String,

    /// Model name sent with every request.
    pub model: String,

    /// Sampling temperature for initial generation.
    pub generate_temperature: f32,

    /// Sampling temperature for repair requests (lower: stay close to the
    /// original).
    pub improve_temperature: f32,

    /// Token budget per completion.
    pub max_tokens: u32,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("CODEGEN_API_KEY").unwrap_or_default(),
            api_url: std::env::var("CODEGEN_API_URL")
                .unwrap_or_else(|_| "https://api.cursor.com/v1".to_string()),
            model: "gpt-4".to_string(),
            generate_temperature: 0.3,
            improve_temperature: 0.2,
            max_tokens: 4000,
        }
    }
}

impl CodegenConfig {
    /// Read configuration from `CODEGEN_API_KEY` / `CODEGEN_API_URL`.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Reject missing or placeholder credentials. Fatal at startup.
    pub fn validate(&self) -> Result<()> {
        let key = self.api_key.trim();
        if PLACEHOLDER_KEYS.contains(&key) {
            return Err(FluxError::Config(
                "CODEGEN_API_KEY is not configured; set it in the environment".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types (chat-completion shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: Option<UpstreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the chat-completion code-generation endpoint.
pub struct CodegenClient {
    config: CodegenConfig,
    http: reqwest::Client,
}

impl CodegenClient {
    /// Build a client, rejecting placeholder credentials up front.
    pub fn new(config: CodegenConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("flux-circuits/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FluxError::Config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    /// Build a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(CodegenConfig::from_env())
    }

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.api_url);
        let request = ChatRequest {
            model: &self.config.model,
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
            temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(url = %url, prompt_len = user.len(), "sending completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| FluxError::InvalidResponse(format!("malformed completion body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| FluxError::InvalidResponse("completion had no choices".to_string()))
    }

    fn network_error(&self, err: reqwest::Error) -> FluxError {
        FluxError::Network {
            url: self.config.api_url.clone(),
            message: err.to_string(),
        }
    }

    /// Extract code from a completion and enforce the minimum length check.
    fn extract_validated(&self, response: &str) -> Result<String> {
        let code = extract_code(response);
        if code.len() < MIN_CODE_LEN {
            return Err(FluxError::InvalidResponse(format!(
                "extracted code is {} bytes, below the {} byte minimum",
                code.len(),
                MIN_CODE_LEN
            )));
        }
        Ok(code)
    }
}

#[async_trait]
impl CodeGenerator for CodegenClient {
    async fn generate_code(&self, idea: &str, characteristics: &[String]) -> Result<String> {
        let prompt = prompts::generate_prompt(idea, characteristics);
        let response = self
            .complete(
                prompts::SYSTEM_GENERATE,
                &prompt,
                self.config.generate_temperature,
            )
            .await?;
        let code = self.extract_validated(&response)?;
        info!(lines = code.lines().count(), "received generated code");
        Ok(code)
    }

    async fn improve_code(
        &self,
        source: &str,
        warnings: &[String],
        errors: &[String],
    ) -> Result<String> {
        let prompt = prompts::improve_prompt(source, warnings, errors);
        let response = self
            .complete(
                prompts::SYSTEM_IMPROVE,
                &prompt,
                self.config.improve_temperature,
            )
            .await?;
        let code = self.extract_validated(&response)?;
        info!(lines = code.lines().count(), "received repaired code");
        Ok(code)
    }
}

/// Map a non-2xx upstream response onto the error taxonomy, carrying the
/// upstream message when the body is the conventional `{"error":
/// {"message": ...}}` shape.
fn map_http_error(status: u16, body: &str) -> FluxError {
    let message = serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "unknown error".to_string()
            } else {
                body.chars().take(200).collect()
            }
        });

    match status {
        401 | 403 => FluxError::AuthFailed { status, message },
        429 => FluxError::RateLimited { message },
        _ => FluxError::Api { status, message },
    }
}
