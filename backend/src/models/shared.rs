use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::analysis::{AnalysisRecord, AnalysisType};

/// 可分享的分析结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedAnalysis {
    pub id: String,
    pub analysis_type: AnalysisType,
    pub analysis_data: AnalysisRecord,
    pub report_text: String,
    /// 原始文件名（对比分析时为两个）
    pub file_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// 仅分享链接有过期时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl SharedAnalysis {
    /// 是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 创建分享链接请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    pub analysis_data: AnalysisRecord,
    #[serde(default)]
    pub report_text: Option<String>,
    #[serde(default)]
    pub file_names: Vec<String>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    /// 已上传音频的标识，用于分享页面播放
    #[serde(default)]
    pub audio_id: Option<String>,
}

/// 创建分享链接响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareResponse {
    pub share_id: String,
    pub share_url: String,
    pub expires_at: DateTime<Utc>,
}

/// 分析接口响应：分析结果平铺在顶层
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub analysis_id: String,
    pub analysis_type: AnalysisType,
    #[serde(flatten)]
    pub analysis: AnalysisRecord,
    pub ai_report: String,
    pub file_names: Vec<String>,
    pub audio_url: String,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResponse {
    /// 转换为可查询的存储条目（不过期）
    pub fn to_shared(&self) -> SharedAnalysis {
        SharedAnalysis {
            id: self.analysis_id.clone(),
            analysis_type: self.analysis_type,
            analysis_data: self.analysis.clone(),
            report_text: self.ai_report.clone(),
            file_names: self.file_names.clone(),
            created_at: self.created_at,
            expires_at: None,
            audio_url: Some(self.audio_url.clone()),
        }
    }
}
