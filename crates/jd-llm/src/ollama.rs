//! Ollama provider implementing the core's injected `ModelInvoker` seam.

use async_trait::async_trait;
use jd_core::{InvokeError, ModelInvoker};
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
            },
        })
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelInvoker for OllamaProvider {
    async fn invoke(&self, prompt: &str) -> Result<String, InvokeError> {
        let body = self.build_request_body(prompt);
        log::debug!("ollama generate: model={}, prompt_len={}", self.model, prompt.len());

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(InvokeError::Api(format!("HTTP {status}: {text}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InvokeError::Json(e.to_string()))?;

        log::debug!("ollama generate done: response_len={}", parsed.response.len());
        Ok(parsed.response)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}
