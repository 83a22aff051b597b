use super::prompts::SYSTEM_PROMPT;
use crate::config::{LlmConfig, LlmProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Remote text-generation service.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub struct LLMClient {
    config: LlmConfig,
    api_key: Option<String>,
    client: Client,
}

impl LLMClient {
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, api_key, client })
    }

    /// Client configured from `config`, with the key read from its env var.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = config.api_key();
        Self::new(config, api_key)
    }

    /// Groq and OpenAI speak the same chat-completions protocol.
    async fn chat_openai_compatible(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            max_tokens: u32,
            temperature: f32,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }

        let api_key = self
            .api_key
            .as_deref()
            .with_context(|| format!("{} is not set", self.config.api_key_env))?;

        let request = Request {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url()))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {:?}", self.config.provider))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("{:?} API error {}: {}", self.config.provider, status, error_text);
        }

        let response_json: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        response_json
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Chat completion returned no choices")
    }

    async fn chat_ollama(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: &'a str,
            system: &'a str,
            stream: bool,
            options: Options,
        }

        #[derive(Serialize)]
        struct Options {
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let request = Request {
            model: &self.config.model,
            prompt,
            system: SYSTEM_PROMPT,
            stream: false,
            options: Options {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.base_url()))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error: {}", error_text);
        }

        let response_json: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(response_json.response)
    }
}

#[async_trait]
impl Summarizer for LLMClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self.config.provider {
            LlmProvider::Groq | LlmProvider::OpenAI => self.chat_openai_compatible(prompt).await,
            LlmProvider::Ollama => self.chat_ollama(prompt).await,
        }
    }
}
