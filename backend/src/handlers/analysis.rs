use super::{AppState, upload::UploadForm};
use crate::{
    error::AppResult,
    file_processing::ProcessedAudio,
    models::{AnalysisRecord, AnalysisResponse, AnalysisType, AudioBlob, audio_url},
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use chrono::Utc;
use uuid::Uuid;

/// 上传单个音频进行数据库扫描
///
/// 结果同时以不过期的分享条目保存，音频以相同ID保存。
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analysis",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "音频文件字段 audio（或 file）"
    ),
    responses(
        (status = 200, description = "分析完成", body = AnalysisResponse),
        (status = 400, description = "缺少音频文件", body = ErrorBody),
        (status = 413, description = "文件过大", body = ErrorBody),
        (status = 415, description = "不是音频文件", body = ErrorBody),
        (status = 500, description = "服务器内部错误", body = ErrorBody)
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AnalysisResponse>> {
    let mut multipart = multipart?;
    let mut form = UploadForm::read(&mut multipart, state.max_file_size()).await?;
    let upload = form.require_file(&["audio", "file"])?;

    let audio = state
        .audio_processor
        .process(
            upload.data,
            &upload.file_name,
            upload.content_type.as_deref(),
        )
        .await?;

    let record = state.strategy.scan(&audio).await?;

    let analysis_id = Uuid::new_v4().to_string();
    let response = finish_analysis(
        &state,
        analysis_id,
        AnalysisType::DatabaseScan,
        record,
        &audio,
        vec![audio.file_name.clone()],
    )
    .await?;

    tracing::info!(
        analysis_id = %response.analysis_id,
        file_name = %audio.file_name,
        size = audio.size,
        risk_score = response.analysis.overview.risk_score,
        "数据库扫描完成"
    );

    Ok(Json(response))
}

/// 上传两个音频直接对比
#[utoipa::path(
    post,
    path = "/api/compare",
    tag = "analysis",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "音频文件字段 original 与 comparison（或 file1/file2）"
    ),
    responses(
        (status = 200, description = "对比完成", body = AnalysisResponse),
        (status = 400, description = "缺少音频文件", body = ErrorBody),
        (status = 413, description = "文件过大", body = ErrorBody),
        (status = 415, description = "不是音频文件", body = ErrorBody),
        (status = 500, description = "服务器内部错误", body = ErrorBody)
    )
)]
pub async fn compare(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<AnalysisResponse>> {
    let mut multipart = multipart?;
    let mut form = UploadForm::read(&mut multipart, state.max_file_size()).await?;
    let original_upload = form.require_file(&["original", "file1"])?;
    let comparison_upload = form.require_file(&["comparison", "file2"])?;

    let original = state
        .audio_processor
        .process(
            original_upload.data,
            &original_upload.file_name,
            original_upload.content_type.as_deref(),
        )
        .await?;
    let comparison = state
        .audio_processor
        .process(
            comparison_upload.data,
            &comparison_upload.file_name,
            comparison_upload.content_type.as_deref(),
        )
        .await?;

    // 对比文件单独保存，匹配项链接指向它
    let comparison_id = Uuid::new_v4().to_string();
    store_audio(&state, &comparison_id, &comparison).await?;
    let comparison_url = audio_url(&comparison_id);

    let record = state
        .strategy
        .compare(&original, &comparison, &comparison_url)
        .await?;

    let analysis_id = Uuid::new_v4().to_string();
    let response = finish_analysis(
        &state,
        analysis_id,
        AnalysisType::DirectComparison,
        record,
        &original,
        vec![original.file_name.clone(), comparison.file_name.clone()],
    )
    .await?;

    tracing::info!(
        analysis_id = %response.analysis_id,
        comparison_id = %comparison_id,
        similarity = response.analysis.overview.similarity,
        "直接对比完成"
    );

    Ok(Json(response))
}

/// 生成报告、保存音频与结果
async fn finish_analysis(
    state: &AppState,
    analysis_id: String,
    analysis_type: AnalysisType,
    record: AnalysisRecord,
    primary: &ProcessedAudio,
    file_names: Vec<String>,
) -> AppResult<AnalysisResponse> {
    let ai_report = state
        .report_generator
        .generate_or_fallback(&record, analysis_type, &file_names)
        .await;

    store_audio(state, &analysis_id, primary).await?;

    let response = AnalysisResponse {
        audio_url: audio_url(&analysis_id),
        analysis_id,
        analysis_type,
        analysis: record,
        ai_report,
        file_names,
        created_at: Utc::now(),
    };

    state
        .analyses
        .put(&response.analysis_id, response.to_shared())
        .await?;

    Ok(response)
}

pub(super) async fn store_audio(
    state: &AppState,
    audio_id: &str,
    audio: &ProcessedAudio,
) -> AppResult<()> {
    state
        .audio
        .put(
            audio_id,
            AudioBlob {
                data: audio.data.clone(),
                mime_type: audio.mime_type.clone(),
                file_name: audio.file_name.clone(),
                sha256: audio.sha256.clone(),
                uploaded_at: Utc::now(),
            },
        )
        .await
}
