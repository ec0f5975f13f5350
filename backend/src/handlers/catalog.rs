use super::{AppState, analysis::store_audio, upload::UploadForm};
use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, RiskLevel, audio_url, parse_tags},
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

const DEFAULT_GENRE: &str = "Unspecified";

/// 提交曲目到已清权曲库
///
/// 未提供 riskScore 时使用当前分析策略扫描得到的分数。
#[utoipa::path(
    post,
    path = "/api/catalog",
    tag = "catalog",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "audio（或 file）、title、artist，可选 genre、tags、riskScore"
    ),
    responses(
        (status = 201, description = "提交成功", body = CatalogEntry),
        (status = 400, description = "缺少必填字段", body = ErrorBody),
        (status = 413, description = "文件过大", body = ErrorBody),
        (status = 415, description = "不是音频文件", body = ErrorBody)
    )
)]
pub async fn submit_to_catalog(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<CatalogEntry>)> {
    let mut multipart = multipart?;
    let mut form = UploadForm::read(&mut multipart, state.max_file_size()).await?;

    let upload = form.require_file(&["audio", "file"])?;
    let title = form.require_text("title")?;
    let artist = form.require_text("artist")?;
    let genre = form.text("genre").unwrap_or(DEFAULT_GENRE).to_string();
    let tags = form.text("tags").map(parse_tags).unwrap_or_default();
    let declared_score = form.text("riskScore").map(parse_risk_score).transpose()?;

    let audio = state
        .audio_processor
        .process(
            upload.data,
            &upload.file_name,
            upload.content_type.as_deref(),
        )
        .await?;

    let risk_score = match declared_score {
        Some(score) => score,
        None => state.strategy.scan(&audio).await?.overview.risk_score,
    };

    let id = Uuid::new_v4().to_string();
    store_audio(&state, &id, &audio).await?;

    let entry = CatalogEntry {
        id: id.clone(),
        title,
        artist,
        genre,
        tags,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        submitted_at: Utc::now(),
        audio_id: id.clone(),
        audio_url: audio_url(&id),
        file_name: audio.file_name.clone(),
    };
    state.catalog.put(&id, entry.clone()).await?;

    tracing::info!(
        catalog_id = %id,
        title = %entry.title,
        risk_score,
        scanned = declared_score.is_none(),
        "曲目已加入曲库"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

/// 曲库列表，按提交时间倒序
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "查询成功", body = Vec<CatalogEntry>)
    )
)]
pub async fn list_catalog(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogEntry>>> {
    let mut entries = state.catalog.list().await?;
    entries.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(Json(entries))
}

/// 解析 0-100 的风险分数，允许小数并四舍五入
fn parse_risk_score(raw: &str) -> AppResult<u32> {
    let value: f64 = raw
        .parse()
        .map_err(|_| AppError::bad_request("riskScore must be a number"))?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::bad_request("riskScore must be between 0 and 100"));
    }
    Ok(value.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_risk_score() {
        assert_eq!(parse_risk_score("42").unwrap(), 42);
        assert_eq!(parse_risk_score("75.6").unwrap(), 76);
        assert!(parse_risk_score("101").is_err());
        assert!(parse_risk_score("-1").is_err());
        assert!(parse_risk_score("high").is_err());
        assert!(parse_risk_score("NaN").is_err());
    }
}
