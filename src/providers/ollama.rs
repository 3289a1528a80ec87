use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{TranslationBackend, TranslatorHandle};

/// Placeholder substituted in model names and prompts
pub const TARGET_LANGUAGE_PLACEHOLDER: &str = "{target_language}";

/// Placeholder substituted with the English language name in prompts
pub const TARGET_LANGUAGE_NAME_PLACEHOLDER: &str = "{target_language_name}";

/// Ollama client for interacting with Ollama API
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from; empty to only load the model
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Random seed for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Duration of loading the model in nanoseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

/// Error body returned by the Ollama API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
            keep_alive: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Fix the sampling seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).seed = Some(seed);
        self
    }

    /// Set the keep-alive duration
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }
}

impl Ollama {
    /// Create a new Ollama client for a base URL such as `http://localhost:11434`
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(20)
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one generation. No retries: failures go straight to the caller.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(format!("{}: {}", url, e))
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            error!("Ollama API error ({}): {}", status, message);

            if status == StatusCode::NOT_FOUND || message.contains("not found") {
                return Err(ProviderError::ModelUnavailable(format!("{}: {}", request.model, message)));
            }
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<GenerationResponse>(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            ProviderError::ParseError(format!("{}. Raw response: {}", e, preview))
        })
    }
}

/// Backend that serves translations from models hosted by Ollama
#[derive(Debug)]
pub struct OllamaBackend {
    client: Ollama,
    /// Model name, may contain `{target_language}`
    model_template: String,
    /// System prompt, may contain `{target_language}` and `{target_language_name}`
    system_prompt_template: String,
    temperature: f32,
    keep_alive: String,
}

impl OllamaBackend {
    /// Create a backend from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            client: Ollama::new(config.endpoint.clone(), config.timeout_secs),
            model_template: config.model.clone(),
            system_prompt_template: config.system_prompt.clone(),
            temperature: config.temperature,
            keep_alive: config.keep_alive.clone(),
        }
    }

    /// Model name used for a target language
    pub fn model_for(&self, target_language: &str) -> String {
        self.model_template.replace(TARGET_LANGUAGE_PLACEHOLDER, target_language)
    }

    /// System prompt used for a target language
    pub fn system_prompt_for(&self, target_language: &str, language_name: &str) -> String {
        self.system_prompt_template
            .replace(TARGET_LANGUAGE_NAME_PLACEHOLDER, language_name)
            .replace(TARGET_LANGUAGE_PLACEHOLDER, target_language)
    }
}

#[async_trait]
impl TranslationBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn load(&self, target_language: &str) -> Result<Arc<dyn TranslatorHandle>, ProviderError> {
        let language_name = language_utils::get_language_name(target_language)
            .map_err(|e| ProviderError::ModelUnavailable(e.to_string()))?;
        let model = self.model_for(target_language);

        // An empty prompt makes Ollama load the model and return immediately
        let preload = GenerationRequest::new(model.clone(), "").keep_alive(self.keep_alive.clone());
        let response = self.client.generate(&preload).await?;
        debug!(
            "Loaded model '{}' for {} in {} ms",
            model,
            language_name,
            response.load_duration.unwrap_or_default() / 1_000_000
        );

        Ok(Arc::new(OllamaTranslator {
            client: self.client.clone(),
            system_prompt: self.system_prompt_for(target_language, &language_name),
            model,
            target_language: target_language.to_string(),
            temperature: self.temperature,
            keep_alive: self.keep_alive.clone(),
        }))
    }
}

/// One model on the Ollama server, bound to one target language
#[derive(Debug)]
pub struct OllamaTranslator {
    client: Ollama,
    model: String,
    system_prompt: String,
    target_language: String,
    temperature: f32,
    keep_alive: String,
}

#[async_trait]
impl TranslatorHandle for OllamaTranslator {
    fn target_language(&self) -> &str {
        &self.target_language
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(self.model.clone(), text)
            .system(self.system_prompt.clone())
            .temperature(self.temperature)
            .seed(0)
            .keep_alive(self.keep_alive.clone());

        let response = self.client.generate(&request).await?;
        if !response.done {
            return Err(ProviderError::ParseError(format!(
                "generation for model '{}' did not complete",
                self.model
            )));
        }
        Ok(response.response)
    }

    async fn release(&self) -> Result<(), ProviderError> {
        let unload = GenerationRequest::new(self.model.clone(), "").keep_alive("0");
        self.client.generate(&unload).await.map(|_| ())
    }
}
