use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use models::{default_gemini_model, GeminiSettings};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Configuration for the Gemini generateContent API.
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub api_key: String,
    pub model: String,
}

impl GeminiClientConfig {
    /// Loads config from env vars:
    /// - `GEMINI_API_KEY` (required)
    /// - `GEMINI_MODEL`   (default: `gemini-3-flash-preview`)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| default_gemini_model());
        Ok(Self { api_key, model })
    }

    pub fn from_settings(settings: &GeminiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }
}

/// A text-generation model taking a fixed system instruction and a prompt.
/// Kept as a trait so the analysis pass-through is testable without HTTP.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String>;
}

/// Minimal Gemini generateContent client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: Url,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self> {
        let base_url = Url::parse(GEMINI_BASE_URL).context("Invalid Gemini base URL")?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    fn endpoint(&self) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", self.config.model))
            .context("Failed to build Gemini generateContent URL")?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, system_instruction: &str, prompt: &str) -> Result<String> {
        let endpoint = self.endpoint()?;

        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(system_instruction)),
            contents: vec![Content::text(prompt)],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.7),
            }),
        };

        tracing::debug!(model = %self.config.model, "calling Gemini generateContent");

        let response: GenerateContentResponse = self
            .http
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .context("POST to Gemini generateContent failed")?
            .error_for_status()
            .context("Gemini generateContent returned non-success status")?
            .json()
            .await
            .context("Failed to parse Gemini response JSON")?;

        Ok(extract_text(response).unwrap_or_default().trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text = content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");
    Some(text)
}
