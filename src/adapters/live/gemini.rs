//! Live adapter for the Gemini `generateContent` API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::DescribeError;
use crate::ports::describer::{DescribeFuture, DescribeRequest, DescribeResponse, Describer};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini describer that calls the Google AI API.
pub struct GeminiDescriber {
    client: Client,
    api_key: String,
}

impl GeminiDescriber {
    /// Create a new Gemini describer with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self { client: Client::new(), api_key }
    }
}

impl Describer for GeminiDescriber {
    fn describe(&self, request: &DescribeRequest) -> DescribeFuture<'_> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", request.model);
        let body = request_body(request);
        Box::pin(async move {
            debug!(%url, "sending generateContent request");
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(DescribeError::Api { status: status.as_u16(), message: response_text });
            }

            let text = extract_text(&response_text)?;
            Ok(DescribeResponse { text })
        })
    }
}

/// Build the JSON body: prompt, image, then instruction, as one user turn.
fn request_body(request: &DescribeRequest) -> serde_json::Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&request.image.data);
    let safety_settings: Vec<serde_json::Value> = request
        .safety_settings
        .iter()
        .map(|s| serde_json::json!({ "category": s.category, "threshold": s.threshold }))
        .collect();

    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                {"text": request.prompt},
                {"inlineData": {"mimeType": request.image.mime_type, "data": encoded}},
                {"text": request.instruction}
            ]
        }],
        "safetySettings": safety_settings
    })
}

/// Join the text parts of the first candidate.
fn extract_text(response_text: &str) -> Result<String, DescribeError> {
    let parsed: GeminiResponse = serde_json::from_str(response_text).map_err(|e| {
        DescribeError::Api { status: 200, message: format!("Failed to parse response: {e}") }
    })?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = parsed
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map_or_else(String::new, |reason| format!(" (blocked: {reason})"));
        let truncated = if response_text.len() > 500 {
            let end = (0..=500).rev().find(|&i| response_text.is_char_boundary(i)).unwrap_or(0);
            format!("{}...", &response_text[..end])
        } else {
            response_text.to_string()
        };
        return Err(DescribeError::Api {
            status: 200,
            message: format!("No text in response{reason}. Body: {truncated}"),
        });
    }

    Ok(text)
}

// --- Gemini API response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
