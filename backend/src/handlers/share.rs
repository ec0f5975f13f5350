use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::{CreateShareRequest, CreateShareResponse, SharedAnalysis, audio_url},
    storage::KeyValueStore,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

/// 创建分享链接，链接在配置的有效期后失效
#[utoipa::path(
    post,
    path = "/api/share",
    tag = "share",
    request_body = CreateShareRequest,
    responses(
        (status = 201, description = "创建成功", body = CreateShareResponse),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 500, description = "服务器内部错误", body = ErrorBody)
    )
)]
pub async fn create_share(
    State(state): State<AppState>,
    payload: Result<Json<CreateShareRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreateShareResponse>)> {
    let Json(request) = payload?;

    let ttl = Duration::from_secs(state.config.share.ttl_secs);
    let share_id = Uuid::new_v4().to_string();
    let created_at = Utc::now();
    let expires_at = chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| created_at.checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::config(format!("无效的分享有效期: {} 秒", state.config.share.ttl_secs))
        })?;

    let entry = SharedAnalysis {
        id: share_id.clone(),
        analysis_type: request.analysis_type,
        analysis_data: request.analysis_data,
        report_text: request.report_text.unwrap_or_default(),
        file_names: request.file_names,
        created_at,
        expires_at: Some(expires_at),
        audio_url: request
            .audio_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(audio_url),
    };
    state.analyses.put(&share_id, entry).await?;
    schedule_expiry(state.analyses.clone(), share_id.clone(), ttl);

    let share_url = format!(
        "{}/shared/{}",
        state.config.share.public_base_url.trim_end_matches('/'),
        share_id
    );

    tracing::info!(share_id = %share_id, expires_at = %expires_at, "创建分享链接");

    Ok((
        StatusCode::CREATED,
        Json(CreateShareResponse {
            share_id,
            share_url,
            expires_at,
        }),
    ))
}

/// 获取已保存的分析结果
#[utoipa::path(
    get,
    path = "/api/analysis/{id}",
    tag = "share",
    params(
        ("id" = String, Path, description = "分析ID或分享ID")
    ),
    responses(
        (status = 200, description = "查询成功", body = SharedAnalysis),
        (status = 404, description = "不存在或已过期", body = ErrorBody)
    )
)]
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SharedAnalysis>> {
    let entry = state
        .analyses
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Analysis"))?;

    // 过期任务尚未执行时也视为不存在
    if entry.is_expired(Utc::now()) {
        state.analyses.delete(&id).await?;
        return Err(AppError::not_found("Analysis"));
    }

    Ok(Json(entry))
}

/// 在 ttl 后删除分享条目
pub fn schedule_expiry(
    store: Arc<dyn KeyValueStore<SharedAnalysis>>,
    share_id: String,
    ttl: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        match store.delete(&share_id).await {
            Ok(true) => tracing::info!(share_id = %share_id, "分享链接已过期删除"),
            Ok(false) => tracing::debug!(share_id = %share_id, "分享链接已不存在"),
            Err(e) => tracing::warn!(share_id = %share_id, "删除过期分享失败: {}", e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis::synthetic::synthesize_scan;
    use crate::storage::MemoryStore;
    use crate::models::AnalysisType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entry(id: &str) -> SharedAnalysis {
        SharedAnalysis {
            id: id.to_string(),
            analysis_type: AnalysisType::DatabaseScan,
            analysis_data: synthesize_scan(&mut StdRng::seed_from_u64(1)),
            report_text: String::new(),
            file_names: vec![],
            created_at: Utc::now(),
            expires_at: None,
            audio_url: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_deleted_after_ttl() {
        let store: Arc<dyn KeyValueStore<SharedAnalysis>> =
            Arc::new(MemoryStore::new("analyses"));
        store.put("s1", entry("s1")).await.unwrap();

        schedule_expiry(store.clone(), "s1".to_string(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(store.exists("s1").await.unwrap());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!store.exists("s1").await.unwrap());
    }
}
