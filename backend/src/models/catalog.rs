use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::analysis::RiskLevel;

/// 已清权曲库条目，创建后不再修改
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    /// 艺人/提交者
    pub artist: String,
    pub genre: String,
    pub tags: Vec<String>,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub submitted_at: DateTime<Utc>,
    pub audio_id: String,
    pub audio_url: String,
    pub file_name: String,
}

/// 解析标签：支持JSON数组或逗号分隔，去空去重并保持顺序
pub fn parse_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let candidates: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
    } else {
        raw.split(',').map(|s| s.to_string()).collect()
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in candidates {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
