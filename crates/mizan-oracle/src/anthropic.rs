use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mizan_core::error::{MizanError, Result};
use mizan_core::oracle::{GenerationRequest, StructuredGenerator};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Structured-generation client over the Anthropic Messages API. When a
/// request asks for web search, the server-side search tool is attached so
/// the model can ground its answer in current sources.
pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

// ── Anthropic Messages API request/response types ──────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    tool_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

// ── Implementation ─────────────────────────────────────────────────────────

impl AnthropicGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key,
            model,
        }
    }

    /// Extract the JSON object from the model's text output, tolerating
    /// markdown code fences and surrounding prose the model might include
    /// despite instructions.
    fn extract_json(raw: &str) -> Result<serde_json::Value> {
        let cleaned = raw.trim();
        let cleaned = if cleaned.starts_with('{') {
            cleaned
        } else {
            let start = cleaned
                .find('{')
                .ok_or_else(|| MizanError::Oracle("No JSON object in model output".to_string()))?;
            let end = cleaned
                .rfind('}')
                .map(|i| i + 1)
                .ok_or_else(|| MizanError::Oracle("Unterminated JSON object".to_string()))?;
            &cleaned[start..end]
        };

        serde_json::from_str(cleaned).map_err(|e| {
            tracing::warn!(error = %e, "Model output is not valid JSON");
            MizanError::Oracle(format!("Failed to parse model JSON output: {e}"))
        })
    }
}

#[async_trait]
impl StructuredGenerator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<serde_json::Value> {
        let tools = if request.web_search {
            vec![Tool {
                tool_type: WEB_SEARCH_TOOL_TYPE.to_string(),
                name: "web_search".to_string(),
            }]
        } else {
            Vec::new()
        };

        let api_request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            system: request.system.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            tools,
        };

        tracing::debug!(
            model = %self.model,
            web_search = request.web_search,
            prompt_len = request.prompt.len(),
            "Sending structured generation request"
        );

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| MizanError::Oracle(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(MizanError::Oracle(format!(
                "Anthropic API returned status {status}: {body}"
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| MizanError::Oracle(format!("Failed to parse API response: {e}")))?;

        // Search-augmented responses interleave tool blocks with text; the
        // final JSON answer lives in the text blocks.
        let text = api_response
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(MizanError::Oracle(
                "No text content block in API response".to_string(),
            ));
        }

        tracing::debug!(
            stop_reason = ?api_response.stop_reason,
            response_len = text.len(),
            "Received structured generation response"
        );

        Self::extract_json(&text)
    }
}
