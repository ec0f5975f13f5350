use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 原始音频数据
#[derive(Debug, Clone)]
pub struct AudioBlob {
    pub data: Bytes,
    pub mime_type: String,
    pub file_name: String,
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
}

/// 音频上传响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudioUploadResponse {
    pub audio_id: String,
    pub mime_type: String,
    pub size: usize,
    /// 文件内容的SHA256，与下载时的 ETag 一致
    pub sha256: String,
    pub url: String,
}

/// 音频访问路径
pub fn audio_url(audio_id: &str) -> String {
    format!("/api/audio/{}", audio_id)
}
