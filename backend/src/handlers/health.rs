use super::AppState;
use crate::error::AppResult;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    #[serde(default)]
    pub detail: bool,
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthDetails {
    pub version: String,
    pub timestamp: String,
    /// 当前分析策略
    pub strategy: String,
    pub llm_configured: bool,
    pub stored_analyses: usize,
    pub catalog_entries: usize,
    pub audio_blobs: usize,
}

/// 健康检查
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    params(
        ("detail" = Option<bool>, Query, description = "是否返回详细信息")
    ),
    responses(
        (status = 200, description = "服务正常", body = HealthResponse),
        (status = 400, description = "查询参数无效", body = ErrorBody)
    )
)]
pub async fn health_check(
    State(state): State<AppState>,
    query: Result<Query<HealthQuery>, QueryRejection>,
) -> AppResult<Json<HealthResponse>> {
    let Query(params) = query?;
    let details = if params.detail {
        Some(HealthDetails {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            strategy: state.strategy.name().to_string(),
            llm_configured: state.report_generator.is_configured(),
            stored_analyses: state.analyses.count().await?,
            catalog_entries: state.catalog.count().await?,
            audio_blobs: state.audio.count().await?,
        })
    } else {
        None
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        details,
    }))
}
