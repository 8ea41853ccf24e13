//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionRequest, SamplingConfig};
use crate::config::LlmConfig;
use crate::error::{ForgeError, ForgeResult, ServiceFailure};

const SERVICE: &str = "gemini";

pub struct GeminiClient {
    api_key: Option<SecretBox<String>>,
    client: reqwest::Client,
    api_base: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiClient {
    pub fn new(api_key: Option<SecretBox<String>>, config: &LlmConfig) -> Self {
        Self {
            api_key,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

fn build_body(request: &CompletionRequest) -> GenerateRequest {
    let text_content = |role: Option<&str>, text: &str| Content {
        role: role.map(String::from),
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    };

    GenerateRequest {
        contents: vec![text_content(Some("user"), &request.prompt)],
        system_instruction: request
            .system_instruction
            .as_deref()
            .map(|s| text_content(None, s)),
        generation_config: generation_config(&request.sampling),
    }
}

fn generation_config(sampling: &SamplingConfig) -> Option<GenerationConfig> {
    if sampling.is_default() {
        return None;
    }
    Some(GenerationConfig {
        temperature: sampling.temperature,
        top_p: sampling.top_p,
        top_k: sampling.top_k,
    })
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> ForgeResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ForgeError::Parse("completion contained no text".into()));
    }
    Ok(text)
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> ForgeResult<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ForgeError::Config("GEMINI KEY not found (set GEMINI_API_KEY)".into()))?;

        let url = format!("{}/models/{}:generateContent", self.api_base, request.model);
        let body = build_body(&request);
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::service(SERVICE, ServiceFailure::Unreachable, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ForgeError::service(
                SERVICE,
                ServiceFailure::from_status(status.as_u16()),
                Some(status.as_u16()),
                format!("Gemini API error {}: {}", status, text),
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::Parse(format!("invalid Gemini response: {}", e)))?;

        tracing::info!(
            "Gemini response from {} in {}ms",
            request.model,
            start.elapsed().as_millis()
        );

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_with_system_and_sampling() {
        let request = CompletionRequest::new("gemini-2.5-flash", "build me a thing")
            .with_system("You are an expert")
            .with_sampling(SamplingConfig::fixed(0.7, 0.95, 40));
        let body = serde_json::to_value(build_body(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "build me a thing");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are an expert");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert!((body["generationConfig"]["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_body_with_default_sampling_omits_config() {
        let request = CompletionRequest::new("m", "p");
        let body = serde_json::to_value(build_body(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "hello " }, { "text": "world" }] }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "hello world");
    }

    #[test]
    fn test_extract_text_empty_is_parse_error() {
        let response: GenerateResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(extract_text(response), Err(ForgeError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let config = LlmConfig {
            // Unroutable: a network attempt would surface as Service, not Config.
            api_base: "http://127.0.0.1:9".into(),
            ..LlmConfig::default()
        };
        let client = GeminiClient::new(None, &config);
        let err = client
            .complete(CompletionRequest::new("m", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }
}
