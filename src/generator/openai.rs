//! OpenAI互換 Chat Completions クライアント
//!
//! 429 と 5xx は指数バックオフで再試行する（1s, 2s, 4s）。

use super::GenerationService;
use crate::config::Config;
use crate::error::{CopyError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_RETRIES: u32 = 4;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTPステータスの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusAction {
    Success,
    Retry,
    Fail,
}

fn classify_status(status: StatusCode) -> StatusAction {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusAction::Retry
    } else if status.is_success() {
        StatusAction::Success
    } else {
        StatusAction::Fail
    }
}

/// 再試行前の待ち時間（1s, 2s, 4s, ...）
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << attempt.saturating_sub(1)))
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CopyError::ApiCall(format!("HTTPクライアント初期化エラー: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl GenerationService for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let mut last_error = CopyError::ApiCall("リクエストが送信されませんでした".into());

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying generation request");
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = CopyError::ApiCall(format!("通信エラー: {}", e));
                    continue;
                }
            };

            let status = response.status();
            match classify_status(status) {
                StatusAction::Retry => {
                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(%status, body = %body, "generation service is unavailable");
                    last_error = CopyError::ApiCall(format!("HTTP {}: {}", status, body));
                    continue;
                }
                StatusAction::Fail => {
                    let body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ApiErrorBody>(&body)
                        .map(|e| e.error.message)
                        .unwrap_or(body);
                    return Err(CopyError::ApiCall(format!("HTTP {}: {}", status, message)));
                }
                StatusAction::Success => {}
            }

            let chat: ChatResponse = response
                .json()
                .await
                .map_err(|e| CopyError::ApiParse(format!("レスポンスJSON: {}", e)))?;

            return chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .map(|content| content.trim().to_string())
                .ok_or_else(|| CopyError::ApiParse("応答が空です".into()));
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-4.1",
            temperature: 0.3,
            messages: vec![ChatMessage { role: "user", content: "hi" }],
            response_format: ResponseFormat { kind: "json_object" },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" {\"a\":1} "}}]}"#;
        let chat: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(chat.choices[0].message.content.as_deref(), Some(" {\"a\":1} "));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), StatusAction::Success);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), StatusAction::Retry);
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), StatusAction::Retry);
        assert_eq!(classify_status(StatusCode::SERVICE_UNAVAILABLE), StatusAction::Retry);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), StatusAction::Fail);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), StatusAction::Fail);
    }

    #[test]
    fn test_backoff_delay_doubles() {
        let delays: Vec<u64> = (1..MAX_RETRIES).map(|a| backoff_delay(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![1000, 2000, 4000]);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = Config {
            api_key: Some("sk-test".into()),
            base_url: "http://localhost:8080/v1/".into(),
            ..Config::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
