use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::KeyStore;
use crate::consts::{API_KEY_ENV, DEFAULT_MODEL};

use super::{Model, ModelReply, ModelRequest, TokenUsage};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// A vision model client for the Google Generative Language API.
///
/// Sends the photo as inline base64 data and asks for a JSON response body.
/// No retry: transport and HTTP failures propagate to the caller.
pub struct GeminiModel {
    model: String,
    keys: KeyStore,
}

impl GeminiModel {
    pub fn new(model: Option<String>, keys: KeyStore) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            keys,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body(request: &ModelRequest) -> ApiRequest {
        ApiRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(&request.instructions)],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::text(&request.prompt),
                    Part::inline_data(request.image.mime(), request.image.payload()),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn extract_reply(response: ApiResponse) -> Result<ModelReply> {
        let text: String = response
            .candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            bail!("Gemini API returned an empty response");
        }

        let usage = response.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(ModelReply { text, usage })
    }
}

#[async_trait]
impl Model for GeminiModel {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelReply> {
        let api_key = self.keys.get_api_key(API_KEY_ENV)?.ok_or_else(|| {
            anyhow::anyhow!(
                "no Gemini credentials found. Run `redmark key set` or set {}.",
                API_KEY_ENV
            )
        })?;

        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let body = Self::build_body(request);

        let client = reqwest::Client::new();
        let resp = client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("Gemini API error ({}): {}", status, text);
        }

        let api_resp: ApiResponse = resp.json().await?;
        Self::extract_reply(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_data(mime: &str, payload: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime.to_string(),
                data: payload.to_string(),
            }),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::DataUri;

    fn request() -> ModelRequest {
        ModelRequest {
            instructions: "grade this".to_string(),
            prompt: "Task Criteria: show all work".to_string(),
            image: DataUri::parse("data:image/png;base64,aGk=").unwrap(),
        }
    }

    #[test]
    fn body_carries_prompt_and_image() {
        let body = GeminiModel::build_body(&request());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "grade this"
        );
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "Task Criteria: show all work"
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inlineData"]["data"], "aGk=");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn body_omits_null_fields() {
        let body = GeminiModel::build_body(&request());
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("null"));
    }

    #[test]
    fn extract_reply_joins_text_parts() {
        let resp: ApiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "{\"report\": "}, {"text": "\"ok\"}"}]
                }
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40}
        }))
        .unwrap();

        let reply = GeminiModel::extract_reply(resp).unwrap();
        assert_eq!(reply.text, "{\"report\": \"ok\"}");
        let usage = reply.usage.unwrap();
        assert_eq!(usage.input_tokens, 120);
        assert_eq!(usage.output_tokens, 40);
    }

    #[test]
    fn extract_reply_without_usage() {
        let resp: ApiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "hello"}]}
            }]
        }))
        .unwrap();

        let reply = GeminiModel::extract_reply(resp).unwrap();
        assert_eq!(reply.text, "hello");
        assert!(reply.usage.is_none());
    }

    #[test]
    fn extract_reply_empty_candidates_fails() {
        let resp: ApiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(GeminiModel::extract_reply(resp).is_err());
    }

    #[test]
    fn default_model_used_when_unspecified() {
        let keys = KeyStore::at(std::path::PathBuf::from("/nonexistent/api_key"));
        let model = GeminiModel::new(None, keys);
        assert_eq!(model.model(), DEFAULT_MODEL);
    }
}
