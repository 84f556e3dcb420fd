use anyhow::Context;
use axum::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::config::GeminiConfig;

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Run a prompt against zero or more images (fetched by URL) and
    /// return the model's raw text reply.
    async fn generate(&self, prompt: &str, image_urls: &[String]) -> anyhow::Result<String>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    async fn fetch_image_b64(&self, url: &str) -> anyhow::Result<String> {
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetch image {}", url))?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }
}

#[async_trait]
impl VisionClient for GeminiClient {
    async fn generate(&self, prompt: &str, image_urls: &[String]) -> anyhow::Result<String> {
        // images go inline as base64 parts after the prompt
        let mut parts = vec![json!({ "text": prompt })];
        for url in image_urls {
            let data = self.fetch_image_b64(url).await?;
            parts.push(json!({
                "inline_data": { "mime_type": "image/jpeg", "data": data }
            }));
        }

        let endpoint = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let resp: GenerateResponse = self
            .http
            .post(&endpoint)
            .json(&json!({ "contents": [{ "parts": parts }] }))
            .send()
            .await
            .context("gemini generateContent")?
            .error_for_status()
            .context("gemini rejected request")?
            .json()
            .await
            .context("decode gemini response")?;

        let text = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        anyhow::ensure!(!text.is_empty(), "empty model reply");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_response_decodes_candidate_text() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "hello" } ], "role": "model" } }
            ]
        }"#;
        let resp: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.candidates[0].content.parts[0].text, "hello");
    }

    #[test]
    fn generate_response_tolerates_no_candidates() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.candidates.is_empty());
    }
}
