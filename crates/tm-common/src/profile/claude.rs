use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::{build_profile_prompt, JSON_ONLY_SYSTEM};
use super::{JobProfile, ProfileError, ProfileGenerator, ProfileRequest};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 1500;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Job-profile generator backed by the Anthropic Messages API. Retries on
/// 429 and 5xx with exponential backoff.
pub struct ClaudeProfileGenerator {
    client: Client,
    api_key: String,
}

impl ClaudeProfileGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    async fn call(&self, prompt: &str) -> Result<MessagesResponse, ProfileError> {
        let request_body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: JSON_ONLY_SYSTEM,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<ProfileError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "profile generation attempt failed; retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    last_error = Some(ProfileError::Http(err));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %body, "profile api returned retryable error");
                last_error = Some(ProfileError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|envelope| envelope.error.message)
                    .unwrap_or(body);
                return Err(ProfileError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let decoded: MessagesResponse = response.json().await?;
            debug!(
                input_tokens = decoded.usage.input_tokens,
                output_tokens = decoded.usage.output_tokens,
                "profile generation succeeded"
            );
            return Ok(decoded);
        }

        Err(last_error.unwrap_or(ProfileError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ProfileGenerator for ClaudeProfileGenerator {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn generate(&self, request: &ProfileRequest) -> Result<JobProfile, ProfileError> {
        let prompt = build_profile_prompt(request);
        let response = self.call(&prompt).await?;

        let text = response.text().ok_or(ProfileError::EmptyContent)?;
        let text = strip_json_fences(text);

        serde_json::from_str(text).map_err(ProfileError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
