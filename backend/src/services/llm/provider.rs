//! 文本生成接口定义。

use crate::models::ChatMessage;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// 流式输出的文本片段
pub type TextStream = BoxStream<'static, Result<String, LlmError>>;

/// 文本生成错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Request timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Connection(e.to_string())
        }
    }
}

/// 一次生成请求
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// 系统提示词
    pub system: Option<String>,
    /// 对话历史，最后一条应为用户消息
    pub messages: Vec<ChatMessage>,
    /// 覆盖默认采样温度
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// 单轮提示
    pub fn prompt<T: Into<String>>(text: T) -> Self {
        Self {
            messages: vec![ChatMessage::user(text)],
            ..Default::default()
        }
    }

    pub fn with_system<T: Into<String>>(mut self, system: T) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// 文本生成服务
#[async_trait]
pub trait TextGenerator: std::fmt::Debug + Send + Sync {
    /// 服务名称，例如 "gemini"
    fn name(&self) -> &str;

    /// 使用的模型
    fn model(&self) -> &str;

    /// 一次性生成完整文本
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// 流式生成，按到达顺序产出文本片段
    async fn stream(&self, request: &GenerationRequest) -> Result<TextStream, LlmError>;
}
