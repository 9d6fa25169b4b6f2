use crate::ai::{AiClient, EndpointContext};
use anyhow::{anyhow, bail, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 200;

const SYSTEM_PROMPT: &str = "You generate concise documentation summaries for HTTP API endpoints.";

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Chat-completion provider.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Option<reqwest::blocking::Client>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        let client = match reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Failed to create HTTP client: {}", e);
                None
            }
        };

        Self { config, client }
    }

    fn request(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("OpenAI API key is missing"))?;
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| anyhow!("HTTP client is unavailable"))?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
        };

        debug!("Requesting completion from {}", self.config.endpoint);
        let response = client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .with_context(|| format!("OpenAI request to {} failed", self.config.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            bail!("OpenAI request failed with status {}", status);
        }

        let payload: ChatResponse = response
            .json()
            .context("Unreadable OpenAI response")?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default())
    }
}

impl AiClient for OpenAiClient {
    fn describe_endpoint(
        &self,
        controller: &str,
        method: &str,
        context: &EndpointContext,
    ) -> String {
        let prompt = match &context.prompt {
            Some(prompt) => prompt.clone(),
            None => build_prompt(controller, method, context),
        };
        let max_tokens = context.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);

        self.request(&prompt, max_tokens).unwrap_or_else(|e| {
            warn!("{:#}", e);
            String::new()
        })
    }
}

/// Prompt describing a route, one fact per line.
pub fn build_prompt(controller: &str, method: &str, context: &EndpointContext) -> String {
    let mut lines = vec![
        format!("Controller: {}", controller),
        format!("Method: {}", method),
        format!("HTTP Methods: {}", context.http_methods),
        format!("URI: {}", context.uri),
    ];
    if !context.name.is_empty() {
        lines.push(format!("Route Name: {}", context.name));
    }
    lines.push(
        "Provide a one or two sentence description suitable for an API reference summary."
            .to_string(),
    );
    lines.join("\n")
}
