use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::analysis::{AnalysisRecord, AnalysisType};

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    /// 前端使用 assistant，Gemini 使用 model，两者等价
    #[serde(alias = "model")]
    Assistant,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user<T: Into<String>>(content: T) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 前端所在页面，决定助手的系统提示词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssistantContext {
    Analysis,
    Catalog,
    Create,
    #[default]
    #[serde(other)]
    General,
}

/// 流式对话请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub context: AssistantContext,
}

/// 报告生成请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub analysis_data: AnalysisRecord,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub file_names: Vec<String>,
}

/// 报告生成响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report_text: String,
}

/// 创意头脑风暴请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrainstormRequest {
    pub prompt: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// 提示词优化请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
}

/// 提示词优化响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptResponse {
    pub enhanced_prompt: String,
}

/// 用户反馈
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub message: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub received: bool,
}
