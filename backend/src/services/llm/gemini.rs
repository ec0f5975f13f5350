//! Gemini 兼容的文本生成客户端。

use super::provider::{GenerationRequest, LlmError, TextGenerator, TextStream};
use crate::{config::LlmConfig, models::ChatRole};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini 客户端
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

// 手动实现以避免在日志中输出密钥
impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GeminiResponse {
    /// 拼接首个候选的所有文本片段
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    /// 创建 Gemini 客户端
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Config(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    fn build_body(&self, request: &GenerationRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: request.system.as_ref().map(|system| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system.clone()),
                }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature.unwrap_or(self.temperature),
            },
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GeminiResponse>(&body)
            .ok()
            .and_then(|r| r.error)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        debug!(
            model = %self.model,
            message_count = request.messages.len(),
            "发送生成请求"
        );

        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.build_body(request))
            .timeout(self.timeout)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("解析Gemini响应失败: {}", e)))?;

        let text = parsed.text();
        if text.trim().is_empty() {
            warn!(model = %self.model, "Gemini返回空文本");
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    async fn stream(&self, request: &GenerationRequest) -> Result<TextStream, LlmError> {
        debug!(
            model = %self.model,
            message_count = request.messages.len(),
            "发送流式生成请求"
        );

        // 流式响应持续时间不确定，只限制连接阶段
        let response = self
            .client
            .post(self.endpoint("streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let chunks = response
            .bytes_stream()
            .scan(SseDecoder::default(), |decoder, chunk| {
                let items: Vec<Result<String, LlmError>> = match chunk {
                    Ok(bytes) => decoder
                        .push(&bytes)
                        .into_iter()
                        .filter_map(|data| parse_event(&data).transpose())
                        .collect(),
                    Err(e) => vec![Err(LlmError::from(e))],
                };
                futures::future::ready(Some(stream::iter(items)))
            })
            .flatten()
            .boxed();

        Ok(chunks)
    }
}

/// 解析单个SSE事件，无文本时返回 None
fn parse_event(data: &str) -> Result<Option<String>, LlmError> {
    if data == "[DONE]" {
        return Ok(None);
    }

    let parsed: GeminiResponse = serde_json::from_str(data)
        .map_err(|e| LlmError::InvalidResponse(format!("解析流式片段失败: {}", e)))?;

    if let Some(error) = parsed.error {
        return Err(LlmError::Api {
            status: error.code,
            message: error.message,
        });
    }

    let text = parsed.text();
    Ok((!text.is_empty()).then_some(text))
}

/// 增量SSE解码器，只输出完整行中的 data 字段
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\r', '\n']);

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    events.push(data.to_string());
                }
            }
        }
        events
    }
}
